//! Light/dark theme resolution, application and toggling.

use crate::storage::{KeyValueStore, Preferences, THEME_KEY};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root attribute mirroring the active theme.
pub const THEME_ATTRIBUTE: &str = "data-theme";
/// Body class present while the theme transition runs.
pub const TRANSITION_CLASS: &str = "theme-transition-active";
/// How long [`TRANSITION_CLASS`] stays on the body.
pub const TRANSITION_MS: u32 = 500;

const SUN_ICON: &str = r#"<i class="fas fa-sun"></i>"#;
const MOON_ICON: &str = r#"<i class="fas fa-moon"></i>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Icon markup for the toggle button: the sun offers a way out of dark mode.
    #[must_use]
    pub const fn toggle_icon(self) -> &'static str {
        match self {
            Self::Dark => SUN_ICON,
            Self::Light => MOON_ICON,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

/// Where the theme lands: the document root, the toggle icon, the body class.
pub trait ThemeSink {
    /// Current value of the root theme attribute, if it names a theme.
    fn current_theme(&self) -> Option<Theme>;
    fn set_theme_attribute(&self, theme: Theme);
    /// Replace the toggle control's icon. No-op when there is no control.
    fn set_toggle_icon(&self, icon: &str);
    /// Add the transition class and remove it after `duration_ms`.
    fn flash_transition(&self, class: &str, duration_ms: u32);
}

/// Operating-system colour scheme preference.
pub trait SystemTheme {
    fn prefers_dark(&self) -> bool;
}

/// Applies, resolves and toggles the theme, persisting user choices.
pub struct ThemeManager<S, T> {
    prefs: Preferences<S>,
    sink: T,
}

impl<S: KeyValueStore, T: ThemeSink> ThemeManager<S, T> {
    pub const fn new(prefs: Preferences<S>, sink: T) -> Self {
        Self { prefs, sink }
    }

    pub const fn sink(&self) -> &T {
        &self.sink
    }

    /// Write `theme` to the root, refresh the toggle icon and run the transition.
    pub fn apply(&self, theme: Theme) {
        self.sink.set_theme_attribute(theme);
        self.sink.set_toggle_icon(theme.toggle_icon());
        self.sink.flash_transition(TRANSITION_CLASS, TRANSITION_MS);
    }

    /// Saved preference first, then the system preference.
    pub fn resolve(&self, system: &impl SystemTheme) -> Theme {
        self.saved().unwrap_or_else(|| {
            if system.prefers_dark() {
                Theme::Dark
            } else {
                Theme::Light
            }
        })
    }

    /// Resolve and apply the initial theme. Returns what was applied.
    pub fn initialize(&self, system: &impl SystemTheme) -> Theme {
        let theme = self.resolve(system);
        self.apply(theme);
        theme
    }

    /// Flip the theme currently on the root, apply it and persist it.
    pub fn toggle(&self) -> Theme {
        let current = self.sink.current_theme().unwrap_or_default();
        let next = current.toggled();
        self.apply(next);
        self.prefs.write(THEME_KEY, next);
        next
    }

    #[must_use]
    pub fn saved(&self) -> Option<Theme> {
        self.prefs.read(THEME_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parses_and_toggles() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert!("sepia".parse::<Theme>().is_err());
        assert_eq!(Theme::Dark.toggled().toggled(), Theme::Dark);
    }

    #[test]
    fn icon_reflects_the_way_back() {
        assert!(Theme::Dark.toggle_icon().contains("fa-sun"));
        assert!(Theme::Light.toggle_icon().contains("fa-moon"));
    }

    #[test]
    fn theme_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Theme::Dark).unwrap(), "\"dark\"");
    }
}
