//! Read-aloud state machine over a text-to-speech engine.
//!
//! The controller owns the single in-flight utterance. Engines report progress
//! through [`ReadAloud::handle_event`], tagged with the utterance id so that
//! callbacks from a cancelled utterance cannot disturb a newer one.

use crate::sound::{Cue, CuePlayer};
use once_cell::sync::Lazy;
use regex::Regex;

pub const ALERT_UNSUPPORTED: &str = "A leitura em voz alta não é suportada no seu navegador.";
pub const ALERT_NOTHING_TO_READ: &str = "Nenhum texto principal encontrado para ler nesta seção.";
pub const ALERT_SPEECH_FAILED: &str =
    "Ocorreu um erro ao tentar ler a página. Por favor, tente novamente.";

static BREAK_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech synthesis is not supported")]
    Unsupported,
    #[error("speech engine rejected the utterance: {0}")]
    Submit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub lang: String,
}

/// Progress reported by the engine for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UtteranceEvent {
    Started,
    Ended,
    Failed(String),
}

/// Error codes the browser reports when speech is cut short on purpose.
#[must_use]
pub fn is_cancellation(code: &str) -> bool {
    matches!(code, "interrupted" | "canceled")
}

pub trait SpeechEngine {
    /// Queue `utterance` for playback.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses the utterance.
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError>;
    /// Stop the current utterance and flush the queue.
    fn cancel(&self);
}

/// Visual state of the read control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    Read,
    Stop,
}

impl Affordance {
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Read => r#"<i class="fas fa-volume-up"></i>"#,
            Self::Stop => r#"<i class="fas fa-stop-circle"></i>"#,
        }
    }

    #[must_use]
    pub const fn aria_label(self) -> &'static str {
        match self {
            Self::Read => "Ler página em voz alta",
            Self::Stop => "Parar leitura",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Read => "Ler Página",
            Self::Stop => "Parar Leitura",
        }
    }
}

pub trait ReadControl {
    fn show(&self, affordance: Affordance);
    /// Remove the control from view for good.
    fn hide(&self);
}

/// Blocking user-facing messages.
pub trait Alerts {
    fn alert(&self, message: &str);
}

/// One candidate element gathered from the content container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlock {
    pub tag: String,
    pub text: String,
    /// Neither `display:none` nor `visibility:hidden` on the element.
    pub visible: bool,
    /// Same check for the parent; `true` when there is no parent.
    pub parent_visible: bool,
}

impl TextBlock {
    #[must_use]
    pub fn visible(tag: &str, text: &str) -> Self {
        Self {
            tag: tag.to_string(),
            text: text.to_string(),
            visible: true,
            parent_visible: true,
        }
    }

    fn is_readable(&self) -> bool {
        let tag = self.tag.to_ascii_uppercase();
        tag != "SCRIPT" && tag != "STYLE" && self.visible && self.parent_visible
    }
}

/// Join readable blocks into one sentence-terminated string.
///
/// Returns `None` when nothing readable remains.
pub fn compose_reading<'a, I>(blocks: I) -> Option<String>
where
    I: IntoIterator<Item = &'a TextBlock>,
{
    let mut text = String::new();
    for block in blocks.into_iter().filter(|b| b.is_readable()) {
        let cleaned = BREAK_TAG.replace_all(&block.text, " ");
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            continue;
        }
        text.push_str(cleaned);
        text.push_str(". ");
    }
    if text.trim().is_empty() {
        return None;
    }
    Some(WHITESPACE.replace_all(&text, " ").trim().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechState {
    Idle,
    /// Submitted, waiting for the engine's start callback.
    Queued(UtteranceId),
    Speaking(UtteranceId),
}

/// Result of a read toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Unsupported,
    Cancelled,
    NothingToRead,
    Queued(UtteranceId),
    Rejected,
}

pub struct ReadAloud<E, C, A, P> {
    engine: Option<E>,
    control: C,
    alerts: A,
    cues: P,
    lang: String,
    state: SpeechState,
    next_id: u64,
}

impl<E, C, A, P> ReadAloud<E, C, A, P>
where
    E: SpeechEngine,
    C: ReadControl,
    A: Alerts,
    P: CuePlayer,
{
    /// `engine` is `None` when the platform has no speech synthesis.
    pub fn new(engine: Option<E>, control: C, alerts: A, cues: P, lang: impl Into<String>) -> Self {
        Self {
            engine,
            control,
            alerts,
            cues,
            lang: lang.into(),
            state: SpeechState::Idle,
            next_id: 0,
        }
    }

    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.engine.is_some()
    }

    #[must_use]
    pub const fn state(&self) -> SpeechState {
        self.state
    }

    /// True while an utterance is queued or playing.
    #[must_use]
    pub const fn is_speaking(&self) -> bool {
        !matches!(self.state, SpeechState::Idle)
    }

    /// Start reading `blocks`, or stop if already reading.
    pub fn toggle<'a, I>(&mut self, blocks: I) -> ReadOutcome
    where
        I: IntoIterator<Item = &'a TextBlock>,
    {
        let Some(engine) = self.engine.as_ref() else {
            log::warn!("{}", SpeechError::Unsupported);
            self.alerts.alert(ALERT_UNSUPPORTED);
            self.control.hide();
            return ReadOutcome::Unsupported;
        };

        if self.is_speaking() {
            engine.cancel();
            self.finish();
            return ReadOutcome::Cancelled;
        }

        let Some(text) = compose_reading(blocks) else {
            log::warn!("No main text found to read in the current section.");
            self.alerts.alert(ALERT_NOTHING_TO_READ);
            return ReadOutcome::NothingToRead;
        };

        self.next_id += 1;
        let utterance = Utterance {
            id: UtteranceId(self.next_id),
            text,
            lang: self.lang.clone(),
        };
        match engine.speak(&utterance) {
            Ok(()) => {
                self.state = SpeechState::Queued(utterance.id);
                ReadOutcome::Queued(utterance.id)
            }
            Err(err) => {
                log::error!("{err}");
                self.alerts.alert(ALERT_SPEECH_FAILED);
                ReadOutcome::Rejected
            }
        }
    }

    /// Feed an engine callback. Events for anything but the current utterance are dropped.
    pub fn handle_event(&mut self, id: UtteranceId, event: UtteranceEvent) {
        let current = match self.state {
            SpeechState::Idle => None,
            SpeechState::Queued(cur) | SpeechState::Speaking(cur) => Some(cur),
        };
        if current != Some(id) {
            log::debug!("Ignoring {event:?} for stale utterance {id:?}");
            return;
        }
        match event {
            UtteranceEvent::Started => {
                self.state = SpeechState::Speaking(id);
                self.control.show(Affordance::Stop);
                self.cues.play(Cue::Transition);
            }
            UtteranceEvent::Ended => self.finish(),
            UtteranceEvent::Failed(code) if is_cancellation(&code) => self.finish(),
            UtteranceEvent::Failed(code) => {
                log::error!("Speech synthesis error: {code}");
                self.finish();
                self.alerts.alert(ALERT_SPEECH_FAILED);
            }
        }
    }

    fn finish(&mut self) {
        self.state = SpeechState::Idle;
        self.control.show(Affordance::Read);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_terminates_and_collapses() {
        let blocks = vec![
            TextBlock::visible("H1", "  Bem-vindo  "),
            TextBlock::visible("P", "Linha um<br/>linha\n\n dois"),
        ];
        assert_eq!(
            compose_reading(&blocks).as_deref(),
            Some("Bem-vindo. Linha um linha dois.")
        );
    }

    #[test]
    fn compose_skips_hidden_and_script_blocks() {
        let blocks = vec![
            TextBlock::visible("SCRIPT", "alert(1)"),
            TextBlock {
                visible: false,
                ..TextBlock::visible("P", "hidden")
            },
            TextBlock {
                parent_visible: false,
                ..TextBlock::visible("LI", "hidden parent")
            },
            TextBlock::visible("strong", "Visível"),
        ];
        assert_eq!(compose_reading(&blocks).as_deref(), Some("Visível."));
    }

    #[test]
    fn compose_with_nothing_readable_is_none() {
        let blocks = vec![TextBlock::visible("P", "   "), TextBlock::visible("LI", "<br>")];
        assert_eq!(compose_reading(&blocks), None);
        assert_eq!(compose_reading(&Vec::<TextBlock>::new()), None);
    }

    #[test]
    fn cancellation_codes() {
        assert!(is_cancellation("interrupted"));
        assert!(is_cancellation("canceled"));
        assert!(!is_cancellation("synthesis-failed"));
    }
}
