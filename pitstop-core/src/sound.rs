//! Named UI cues and a lazily started sound board.

use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio context failed to start: {0}")]
    Start(String),
    #[error("synth unavailable: {0}")]
    Synth(String),
    #[error("audio context is still starting")]
    Pending,
}

/// Short feedback sounds. Unknown names fall back to [`Cue::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cue {
    Click,
    Success,
    Error,
    Transition,
    Hover,
    VibrationSoft,
    VibrationMedium,
    Default,
}

impl Cue {
    pub const ALL: [Self; 8] = [
        Self::Click,
        Self::Success,
        Self::Error,
        Self::Transition,
        Self::Hover,
        Self::VibrationSoft,
        Self::VibrationMedium,
        Self::Default,
    ];

    /// Scientific pitch notation understood by the synth.
    #[must_use]
    pub const fn note(self) -> &'static str {
        match self {
            Self::Click => "C5",
            Self::Success => "G4",
            Self::Error => "C#3",
            Self::Transition => "E4",
            Self::Hover | Self::Default => "C4",
            Self::VibrationSoft => "C2",
            Self::VibrationMedium => "C1",
        }
    }

    /// Note length in transport notation (`"8n"` is an eighth note).
    #[must_use]
    pub const fn duration(self) -> &'static str {
        match self {
            Self::Click | Self::VibrationSoft => "64n",
            Self::Success | Self::Error => "8n",
            Self::Transition => "16n",
            Self::Hover => "128n",
            Self::VibrationMedium | Self::Default => "32n",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Success => "success",
            Self::Error => "error",
            Self::Transition => "transition",
            Self::Hover => "hover",
            Self::VibrationSoft => "vibration-soft",
            Self::VibrationMedium => "vibration-medium",
            Self::Default => "default",
        }
    }

    /// Resolve a cue name, mapping anything unknown to [`Cue::Default`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or(Self::Default)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cue| cue.name() == s)
            .ok_or_else(|| format!("unknown cue '{s}'"))
    }
}

/// Oscillator and envelope handed to the synth constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthOptions {
    pub oscillator: Oscillator,
    pub envelope: Envelope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oscillator {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            oscillator: Oscillator {
                kind: "sine".to_string(),
            },
            envelope: Envelope {
                attack: 0.01,
                decay: 0.1,
                sustain: 0.05,
                release: 0.5,
            },
        }
    }
}

/// Synthesis backend. Browsers require a user gesture before `start` succeeds.
pub trait AudioEngine {
    /// Resume the audio context and build the synth.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Pending`] while an asynchronous start is in
    /// flight, or another error if the context or the synth cannot be created.
    fn start(&mut self, options: &SynthOptions) -> Result<(), AudioError>;

    /// Play `note` for `duration`.
    ///
    /// # Errors
    ///
    /// Returns an error if the synth rejects the trigger.
    fn trigger(&mut self, note: &str, duration: &str) -> Result<(), AudioError>;

    /// Hold a cue until a pending start completes. Only the latest cue is kept.
    fn queue(&mut self, _note: &str, _duration: &str) {}
}

/// Anything that can play a cue. Managers only see this.
pub trait CuePlayer {
    fn play(&self, cue: Cue);
}

impl<P: CuePlayer + ?Sized> CuePlayer for Rc<P> {
    fn play(&self, cue: Cue) {
        (**self).play(cue);
    }
}

/// Player that drops every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct Muted;

impl CuePlayer for Muted {
    fn play(&self, _cue: Cue) {}
}

/// Owns the audio engine and the "started" flag.
///
/// The engine starts at most once; a failed start is retried on the next cue.
pub struct SoundBoard<E> {
    engine: RefCell<E>,
    options: SynthOptions,
    started: Cell<bool>,
}

impl<E: AudioEngine> SoundBoard<E> {
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, SynthOptions::default())
    }

    pub fn with_options(engine: E, options: SynthOptions) -> Self {
        Self {
            engine: RefCell::new(engine),
            options,
            started: Cell::new(false),
        }
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    /// Start the engine if it has not started yet. Returns whether it is running.
    pub fn ensure_started(&self) -> bool {
        self.try_start().is_ok()
    }

    fn try_start(&self) -> Result<(), AudioError> {
        if self.started.get() {
            return Ok(());
        }
        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            return Err(AudioError::Pending);
        };
        match engine.start(&self.options) {
            Ok(()) => {
                self.started.set(true);
                log::info!("Audio context started and synth initialized.");
                Ok(())
            }
            Err(AudioError::Pending) => Err(AudioError::Pending),
            Err(err) => {
                log::error!("Failed to start audio context: {err}");
                Err(err)
            }
        }
    }

    /// Borrow the engine, e.g. to inspect a recording backend.
    pub fn with_engine<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&self.engine.borrow())
    }
}

impl<E: AudioEngine> CuePlayer for SoundBoard<E> {
    fn play(&self, cue: Cue) {
        let started = self.try_start();
        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            return;
        };
        match started {
            Ok(()) => {}
            Err(AudioError::Pending) => {
                engine.queue(cue.note(), cue.duration());
                return;
            }
            Err(_) => {
                log::warn!("Audio context not started, cannot play sound.");
                return;
            }
        }
        if let Err(err) = engine.trigger(cue.note(), cue.duration()) {
            log::warn!("Cue '{cue}' dropped: {err}");
        }
    }
}
