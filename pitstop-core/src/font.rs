//! Root font-size scaling within fixed bounds.

use crate::config::FontConfig;
use crate::sound::{Cue, CuePlayer};
use crate::storage::{FONT_SIZE_KEY, KeyValueStore, Preferences};

/// Read and write the root element's font size.
pub trait FontSink {
    /// Computed root font size in CSS pixels, if it can be measured.
    fn root_font_px(&self) -> Option<f64>;
    /// Set the root font size as an inline percentage.
    fn set_root_font_percent(&self, percent: f64);
}

pub struct FontScaler<S, F, P> {
    prefs: Preferences<S>,
    sink: F,
    cues: P,
    config: FontConfig,
}

impl<S, F, P> FontScaler<S, F, P>
where
    S: KeyValueStore,
    F: FontSink,
    P: CuePlayer,
{
    pub const fn new(prefs: Preferences<S>, sink: F, cues: P, config: FontConfig) -> Self {
        Self {
            prefs,
            sink,
            cues,
            config,
        }
    }

    /// Round to hundredths, then clamp into the configured bounds.
    #[must_use]
    pub fn clamp(&self, percent: f64) -> f64 {
        round_percent(percent).clamp(self.config.min_percent, self.config.max_percent)
    }

    /// Current size as a percentage of the browser base size.
    #[must_use]
    pub fn current_percent(&self) -> f64 {
        self.sink
            .root_font_px()
            .map_or(100.0, |px| px / self.config.base_px * 100.0)
    }

    /// Shift the root size by `delta` percentage points, clamp, apply and persist.
    pub fn adjust(&self, delta: f64) -> f64 {
        self.cues.play(Cue::Click);
        let next = self.clamp(self.current_percent() + delta);
        self.sink.set_root_font_percent(next);
        self.prefs.write(FONT_SIZE_KEY, next);
        next
    }

    pub fn increase(&self) -> f64 {
        self.adjust(self.config.step_percent)
    }

    pub fn decrease(&self) -> f64 {
        self.adjust(-self.config.step_percent)
    }

    /// Re-apply a persisted size. Returns it when one was found.
    pub fn restore(&self) -> Option<f64> {
        let saved: f64 = self.prefs.read(FONT_SIZE_KEY)?;
        if saved <= 0.0 {
            return None;
        }
        let percent = self.clamp(saved);
        self.sink.set_root_font_percent(percent);
        Some(percent)
    }
}

/// Hundredths are all a CSS percentage needs, and they keep `px / base * 100`
/// drift out of the stored value.
#[must_use]
pub fn round_percent(percent: f64) -> f64 {
    (percent * 100.0).round() / 100.0
}

/// Inline style value for a percentage, without a trailing `.0` for whole numbers.
#[must_use]
pub fn percent_style(percent: f64) -> String {
    if percent.fract() == 0.0 {
        format!("{percent:.0}%")
    } else {
        format!("{percent}%")
    }
}
