//! Pitstop presentation core
//!
//! Platform-agnostic logic behind the Manual Pitstop site controls: persisted
//! preferences, sound cues, theming, font scaling, read-aloud and section
//! navigation. Browser capabilities are traits; `pitstop-web` implements them
//! over the DOM and [`headless`] implements them in memory.

pub mod config;
pub mod emoji;
pub mod font;
pub mod headless;
pub mod navigation;
pub mod sound;
pub mod speech;
pub mod storage;
pub mod theme;

// Re-export commonly used types
pub use config::{ConfigError, FontConfig, SiteConfig};
pub use emoji::{EmojiRecycler, FALLBACK_EMOJI, unique_emoji};
pub use font::{FontScaler, FontSink, percent_style};
pub use navigation::{
    CurrentSection, NavParams, NavTrigger, NavigationError, Navigator, SectionId,
    SectionRegistry, SectionShown, SectionView, parse_params,
};
pub use sound::{AudioEngine, AudioError, Cue, CuePlayer, Muted, SoundBoard, SynthOptions};
pub use speech::{
    Affordance, Alerts, ReadAloud, ReadControl, ReadOutcome, SpeechEngine, SpeechError,
    SpeechState, TextBlock, Utterance, UtteranceEvent, UtteranceId, compose_reading,
};
pub use storage::{KeyValueStore, MemoryStore, Preferences, StorageError, StorageOp};
pub use theme::{SystemTheme, Theme, ThemeManager, ThemeSink};
