//! In-memory page, speech engine and audio backend.
//!
//! These implement every capability trait without a browser so the managers
//! can be driven from native tests and the QA tester. Clones share state.

use crate::config::FontConfig;
use crate::font::FontSink;
use crate::navigation::{SectionId, SectionShown, SectionView};
use crate::sound::{AudioEngine, AudioError, Cue, CuePlayer, SynthOptions};
use crate::speech::{Affordance, Alerts, ReadControl, SpeechEngine, SpeechError, Utterance};
use crate::theme::{SystemTheme, Theme, ThemeSink};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct PageState {
    theme: Option<Theme>,
    has_toggle: bool,
    toggle_icon: Option<String>,
    transitions: Vec<(String, u32)>,
    prefers_dark: bool,
    root_font_px: f64,
    inline_font_percent: Option<f64>,
    sections: BTreeMap<String, bool>,
    scrolls: usize,
    animation_refreshes: usize,
    announcements: Vec<SectionShown>,
    affordance: Option<Affordance>,
    read_hidden: bool,
    alerts: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HeadlessPage {
    base_px: f64,
    state: Rc<RefCell<PageState>>,
}

impl Default for HeadlessPage {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessPage {
    #[must_use]
    pub fn new() -> Self {
        let base_px = FontConfig::default().base_px;
        Self {
            base_px,
            state: Rc::new(RefCell::new(PageState {
                has_toggle: true,
                root_font_px: base_px,
                ..PageState::default()
            })),
        }
    }

    /// Add sections to the document; only the first starts visible.
    #[must_use]
    pub fn with_sections<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.state.borrow_mut();
            let first_new = state.sections.is_empty();
            for (idx, id) in ids.into_iter().enumerate() {
                state.sections.insert(id.into(), !(first_new && idx == 0));
            }
        }
        self
    }

    #[must_use]
    pub fn without_toggle(self) -> Self {
        self.state.borrow_mut().has_toggle = false;
        self
    }

    #[must_use]
    pub fn prefers_dark(self, dark: bool) -> Self {
        self.state.borrow_mut().prefers_dark = dark;
        self
    }

    pub fn set_root_font_px(&self, px: f64) {
        self.state.borrow_mut().root_font_px = px;
    }

    pub fn set_section_hidden(&self, id: &str, hidden: bool) {
        self.state
            .borrow_mut()
            .sections
            .insert(id.to_string(), hidden);
    }

    #[must_use]
    pub fn theme(&self) -> Option<Theme> {
        self.state.borrow().theme
    }

    #[must_use]
    pub fn toggle_icon(&self) -> Option<String> {
        self.state.borrow().toggle_icon.clone()
    }

    #[must_use]
    pub fn transitions(&self) -> Vec<(String, u32)> {
        self.state.borrow().transitions.clone()
    }

    #[must_use]
    pub fn root_font_px(&self) -> f64 {
        self.state.borrow().root_font_px
    }

    #[must_use]
    pub fn inline_font_percent(&self) -> Option<f64> {
        self.state.borrow().inline_font_percent
    }

    /// Sections currently lacking the hidden marker, in id order.
    #[must_use]
    pub fn visible_sections(&self) -> Vec<String> {
        self.state
            .borrow()
            .sections
            .iter()
            .filter(|(_, hidden)| !**hidden)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Snapshot of every section's hidden flag.
    #[must_use]
    pub fn section_states(&self) -> BTreeMap<String, bool> {
        self.state.borrow().sections.clone()
    }

    #[must_use]
    pub fn scrolls(&self) -> usize {
        self.state.borrow().scrolls
    }

    #[must_use]
    pub fn animation_refreshes(&self) -> usize {
        self.state.borrow().animation_refreshes
    }

    #[must_use]
    pub fn announcements(&self) -> Vec<SectionShown> {
        self.state.borrow().announcements.clone()
    }

    #[must_use]
    pub fn affordance(&self) -> Option<Affordance> {
        self.state.borrow().affordance
    }

    #[must_use]
    pub fn read_control_hidden(&self) -> bool {
        self.state.borrow().read_hidden
    }

    #[must_use]
    pub fn alerts(&self) -> Vec<String> {
        self.state.borrow().alerts.clone()
    }
}

impl ThemeSink for HeadlessPage {
    fn current_theme(&self) -> Option<Theme> {
        self.state.borrow().theme
    }

    fn set_theme_attribute(&self, theme: Theme) {
        self.state.borrow_mut().theme = Some(theme);
    }

    fn set_toggle_icon(&self, icon: &str) {
        let mut state = self.state.borrow_mut();
        if state.has_toggle {
            state.toggle_icon = Some(icon.to_string());
        }
    }

    fn flash_transition(&self, class: &str, duration_ms: u32) {
        self.state
            .borrow_mut()
            .transitions
            .push((class.to_string(), duration_ms));
    }
}

impl SystemTheme for HeadlessPage {
    fn prefers_dark(&self) -> bool {
        self.state.borrow().prefers_dark
    }
}

impl FontSink for HeadlessPage {
    fn root_font_px(&self) -> Option<f64> {
        Some(self.state.borrow().root_font_px)
    }

    fn set_root_font_percent(&self, percent: f64) {
        let mut state = self.state.borrow_mut();
        state.inline_font_percent = Some(percent);
        state.root_font_px = percent / 100.0 * self.base_px;
    }
}

impl SectionView for HeadlessPage {
    fn contains(&self, id: &SectionId) -> bool {
        self.state.borrow().sections.contains_key(id.as_str())
    }

    fn is_hidden(&self, id: &SectionId) -> bool {
        self.state
            .borrow()
            .sections
            .get(id.as_str())
            .copied()
            .unwrap_or(true)
    }

    fn set_hidden(&self, id: &SectionId, hidden: bool) {
        if let Some(flag) = self.state.borrow_mut().sections.get_mut(id.as_str()) {
            *flag = hidden;
        }
    }

    fn scroll_to_top(&self) {
        self.state.borrow_mut().scrolls += 1;
    }

    fn refresh_animations(&self) {
        self.state.borrow_mut().animation_refreshes += 1;
    }

    fn announce(&self, shown: &SectionShown) {
        self.state.borrow_mut().announcements.push(shown.clone());
    }
}

impl ReadControl for HeadlessPage {
    fn show(&self, affordance: Affordance) {
        self.state.borrow_mut().affordance = Some(affordance);
    }

    fn hide(&self) {
        self.state.borrow_mut().read_hidden = true;
    }
}

impl Alerts for HeadlessPage {
    fn alert(&self, message: &str) {
        self.state.borrow_mut().alerts.push(message.to_string());
    }
}

#[derive(Debug, Default)]
struct SpeechLog {
    spoken: Vec<Utterance>,
    cancels: usize,
    reject: bool,
}

/// Speech engine that records submissions; the caller delivers callbacks.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSpeech {
    log: Rc<RefCell<SpeechLog>>,
}

impl ScriptedSpeech {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `speak` fail.
    pub fn reject_next(&self, reject: bool) {
        self.log.borrow_mut().reject = reject;
    }

    #[must_use]
    pub fn spoken(&self) -> Vec<Utterance> {
        self.log.borrow().spoken.clone()
    }

    #[must_use]
    pub fn cancels(&self) -> usize {
        self.log.borrow().cancels
    }
}

impl SpeechEngine for ScriptedSpeech {
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        let mut log = self.log.borrow_mut();
        if log.reject {
            return Err(SpeechError::Submit("engine busy".into()));
        }
        log.spoken.push(utterance.clone());
        Ok(())
    }

    fn cancel(&self) {
        self.log.borrow_mut().cancels += 1;
    }
}

#[derive(Debug, Default)]
struct AudioLog {
    fail_starts: u32,
    pending_starts: u32,
    starts: u32,
    notes: Vec<(String, String)>,
    queued: Vec<(String, String)>,
}

/// Audio backend that records triggered notes.
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    log: Rc<RefCell<AudioLog>>,
}

impl RecordingAudio {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` start attempts.
    #[must_use]
    pub fn failing_starts(self, n: u32) -> Self {
        self.log.borrow_mut().fail_starts = n;
        self
    }

    /// Report the next `n` start attempts as still in flight.
    #[must_use]
    pub fn pending_starts(self, n: u32) -> Self {
        self.log.borrow_mut().pending_starts = n;
        self
    }

    #[must_use]
    pub fn starts(&self) -> u32 {
        self.log.borrow().starts
    }

    #[must_use]
    pub fn notes(&self) -> Vec<(String, String)> {
        self.log.borrow().notes.clone()
    }

    /// Cues handed over while a start was pending.
    #[must_use]
    pub fn queued(&self) -> Vec<(String, String)> {
        self.log.borrow().queued.clone()
    }
}

impl AudioEngine for RecordingAudio {
    fn start(&mut self, _options: &SynthOptions) -> Result<(), AudioError> {
        let mut log = self.log.borrow_mut();
        log.starts += 1;
        if log.fail_starts > 0 {
            log.fail_starts -= 1;
            return Err(AudioError::Start("user gesture required".into()));
        }
        if log.pending_starts > 0 {
            log.pending_starts -= 1;
            return Err(AudioError::Pending);
        }
        Ok(())
    }

    fn trigger(&mut self, note: &str, duration: &str) -> Result<(), AudioError> {
        self.log
            .borrow_mut()
            .notes
            .push((note.to_string(), duration.to_string()));
        Ok(())
    }

    fn queue(&mut self, note: &str, duration: &str) {
        self.log
            .borrow_mut()
            .queued
            .push((note.to_string(), duration.to_string()));
    }
}

/// Cue player that only remembers what it was asked to play.
#[derive(Debug, Clone, Default)]
pub struct CueLog {
    cues: Rc<RefCell<Vec<Cue>>>,
}

impl CueLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn cues(&self) -> Vec<Cue> {
        self.cues.borrow().clone()
    }
}

impl CuePlayer for CueLog {
    fn play(&self, cue: Cue) {
        self.cues.borrow_mut().push(cue);
    }
}
