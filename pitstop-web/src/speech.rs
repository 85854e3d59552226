//! Browser `speechSynthesis` behind the core `SpeechEngine` trait.

use crate::dom::{has_global, js_error_message, window};
use js_sys::Reflect;
use pitstop_core::{SpeechEngine, SpeechError, Utterance, UtteranceEvent, UtteranceId};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, SpeechSynthesis, SpeechSynthesisUtterance};

/// Receives utterance callbacks; installed once the reader exists.
pub type SpeechListener = Rc<dyn Fn(UtteranceId, UtteranceEvent)>;

type ListenerSlot = Rc<RefCell<Option<SpeechListener>>>;
type ActiveSlot = Rc<RefCell<Option<ActiveUtterance>>>;

/// The utterance being spoken and the one handler serving all its callbacks.
struct ActiveUtterance {
    id: UtteranceId,
    native: SpeechSynthesisUtterance,
    _handler: Closure<dyn FnMut(Event)>,
}

impl Drop for ActiveUtterance {
    fn drop(&mut self) {
        self.native.set_onstart(None);
        self.native.set_onend(None);
        self.native.set_onerror(None);
    }
}

#[derive(Clone)]
pub struct WebSpeech {
    synth: SpeechSynthesis,
    listener: ListenerSlot,
    active: ActiveSlot,
}

impl WebSpeech {
    /// The page's speech engine, or `None` when the browser has none.
    #[must_use]
    pub fn detect() -> Option<Self> {
        if !has_global("speechSynthesis") {
            return None;
        }
        let synth = window()?.speech_synthesis().ok()?;
        Some(Self {
            synth,
            listener: Rc::new(RefCell::new(None)),
            active: Rc::new(RefCell::new(None)),
        })
    }

    pub fn set_listener(&self, listener: SpeechListener) {
        self.listener.replace(Some(listener));
    }
}

fn emit(slot: &ListenerSlot, id: UtteranceId, event: UtteranceEvent) {
    let listener = slot.borrow().clone();
    if let Some(listener) = listener {
        listener(id, event);
    }
}

fn error_code(event: &JsValue) -> String {
    Reflect::get(event, &JsValue::from_str("error"))
        .ok()
        .and_then(|code| code.as_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Map a DOM event type onto utterance progress.
fn classify(kind: &str, error: impl FnOnce() -> String) -> Option<UtteranceEvent> {
    match kind {
        "start" => Some(UtteranceEvent::Started),
        "end" => Some(UtteranceEvent::Ended),
        "error" => Some(UtteranceEvent::Failed(error())),
        _ => None,
    }
}

/// Drop the handler for `id` once the callback that finished it has returned.
fn release(active: &ActiveSlot, id: UtteranceId) {
    let active = Rc::clone(active);
    wasm_bindgen_futures::spawn_local(async move {
        let finished = active.borrow_mut().take_if(|current| current.id == id);
        drop(finished);
    });
}

/// Route `native`'s callbacks to `listener` and track it in `active`,
/// replacing (and detaching) any previous utterance.
fn attach(
    native: SpeechSynthesisUtterance,
    id: UtteranceId,
    listener: &ListenerSlot,
    active: &ActiveSlot,
) {
    let (listener, slot) = (Rc::clone(listener), Rc::clone(active));
    let handler = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        let Some(update) = classify(&event.type_(), || error_code(&event)) else {
            return;
        };
        let finished = update != UtteranceEvent::Started;
        emit(&listener, id, update);
        if finished {
            release(&slot, id);
        }
    });
    native.set_onstart(Some(handler.as_ref().unchecked_ref()));
    native.set_onend(Some(handler.as_ref().unchecked_ref()));
    native.set_onerror(Some(handler.as_ref().unchecked_ref()));
    let previous = active.replace(Some(ActiveUtterance {
        id,
        native,
        _handler: handler,
    }));
    drop(previous);
}

impl SpeechEngine for WebSpeech {
    fn speak(&self, utterance: &Utterance) -> Result<(), SpeechError> {
        let native = SpeechSynthesisUtterance::new_with_text(&utterance.text)
            .map_err(|err| SpeechError::Submit(js_error_message(&err)))?;
        native.set_lang(&utterance.lang);
        attach(native.clone(), utterance.id, &self.listener, &self.active);
        self.synth.speak(&native);
        Ok(())
    }

    fn cancel(&self) {
        self.synth.cancel();
    }
}
