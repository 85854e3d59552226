//! Tone.js synth behind the core `AudioEngine` trait.

use crate::dom::{js_error_message, on_first_click, root_element};
use js_sys::Promise;
use pitstop_core::{AudioEngine, AudioError, SoundBoard, SynthOptions};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(catch, js_namespace = Tone, js_name = start)]
    fn tone_start() -> Result<Promise, JsValue>;

    #[wasm_bindgen(js_namespace = Tone)]
    type Synth;

    #[wasm_bindgen(catch, constructor, js_namespace = Tone)]
    fn new(options: &JsValue) -> Result<Synth, JsValue>;

    #[wasm_bindgen(catch, method, js_name = toDestination)]
    fn to_destination(this: &Synth) -> Result<Synth, JsValue>;

    #[wasm_bindgen(catch, method, js_name = triggerAttackRelease)]
    fn trigger_attack_release(this: &Synth, note: &str, duration: &str) -> Result<(), JsValue>;
}

/// Sound board shared by every manager on the page.
pub type PageSounds = Rc<SoundBoard<ToneEngine>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum StartState {
    #[default]
    Idle,
    Pending,
    Ready,
}

/// State the `Tone.start()` continuation writes back into.
#[derive(Default)]
struct ToneShared {
    state: Cell<StartState>,
    synth: RefCell<Option<Synth>>,
    queued: RefCell<Option<(String, String)>>,
}

impl ToneShared {
    /// The context resumed: build the synth and play the cue held meanwhile.
    fn finish(&self, options: &JsValue) {
        match Synth::new(options).and_then(|synth| synth.to_destination()) {
            Ok(synth) => {
                if let Some((note, duration)) = self.queued.take() {
                    if let Err(err) = synth.trigger_attack_release(&note, &duration) {
                        log::warn!("Queued cue dropped: {}", js_error_message(&err));
                    }
                }
                self.synth.replace(Some(synth));
                self.state.set(StartState::Ready);
            }
            Err(err) => {
                log::error!("Failed to build synth: {}", js_error_message(&err));
                self.reset();
            }
        }
    }

    fn reset(&self) {
        self.queued.take();
        self.state.set(StartState::Idle);
    }
}

/// Reports [`AudioError::Pending`] until `Tone.start()` resolves. A rejected
/// start returns to idle so the next cue tries again.
#[derive(Default)]
pub struct ToneEngine {
    shared: Rc<ToneShared>,
}

impl AudioEngine for ToneEngine {
    fn start(&mut self, options: &SynthOptions) -> Result<(), AudioError> {
        match self.shared.state.get() {
            StartState::Ready => return Ok(()),
            StartState::Pending => return Err(AudioError::Pending),
            StartState::Idle => {}
        }
        let options = options
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|err| AudioError::Synth(err.to_string()))?;
        let resume = tone_start().map_err(|err| AudioError::Start(js_error_message(&err)))?;

        self.shared.state.set(StartState::Pending);
        let shared = Rc::clone(&self.shared);
        wasm_bindgen_futures::spawn_local(async move {
            match JsFuture::from(resume).await {
                Ok(_) => shared.finish(&options),
                Err(err) => {
                    log::error!("Audio context refused to resume: {}", js_error_message(&err));
                    shared.reset();
                }
            }
        });
        Err(AudioError::Pending)
    }

    fn trigger(&mut self, note: &str, duration: &str) -> Result<(), AudioError> {
        let synth = self.shared.synth.borrow();
        let synth = synth
            .as_ref()
            .ok_or_else(|| AudioError::Synth("synth not initialized".into()))?;
        synth
            .trigger_attack_release(note, duration)
            .map_err(|err| AudioError::Synth(js_error_message(&err)))
    }

    fn queue(&mut self, note: &str, duration: &str) {
        self.shared
            .queued
            .replace(Some((note.to_string(), duration.to_string())));
    }
}

/// Start audio on the first click anywhere, in case no cue comes first.
pub fn start_on_first_click(sounds: &PageSounds) {
    let Some(root) = root_element() else {
        return;
    };
    let sounds = Rc::clone(sounds);
    if let Err(err) = on_first_click(&root, move || {
        sounds.ensure_started();
    }) {
        log::warn!("Could not arm audio start: {}", js_error_message(&err));
    }
}
