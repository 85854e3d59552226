#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Function, Promise, Reflect};
use pitstop_core::{Cue, CuePlayer, SoundBoard};
use pitstop_web::audio::ToneEngine;
use pitstop_web::dom;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

// Stand-in for Tone.js: `start()` rejects until `allow` is set.
const FAKE_TONE: &str = r"
window.__tone = { starts: 0, played: [], allow: false };
window.Tone = {
  start() {
    window.__tone.starts += 1;
    return window.__tone.allow
      ? Promise.resolve()
      : Promise.reject(new Error('user gesture required'));
  },
  Synth: class {
    toDestination() { return this; }
    triggerAttackRelease(note, duration) { window.__tone.played.push(note + '/' + duration); }
  },
};
";

fn install_fake_tone() {
    Function::new_no_args(FAKE_TONE)
        .call0(&JsValue::NULL)
        .expect("install Tone");
}

fn tone_state() -> JsValue {
    Reflect::get(&js_sys::global(), &JsValue::from_str("__tone")).expect("tone state")
}

fn starts() -> f64 {
    Reflect::get(&tone_state(), &JsValue::from_str("starts"))
        .expect("starts")
        .as_f64()
        .unwrap_or_default()
}

fn played() -> Vec<String> {
    Reflect::get(&tone_state(), &JsValue::from_str("played"))
        .expect("played")
        .unchecked_into::<Array>()
        .iter()
        .filter_map(|note| note.as_string())
        .collect()
}

fn allow_start() {
    Reflect::set(&tone_state(), &JsValue::from_str("allow"), &JsValue::TRUE).expect("allow");
}

/// Let pending promise continuations run.
async fn settle() {
    let timer = Promise::new(&mut |resolve, _| {
        dom::window()
            .expect("window")
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
            .expect("timer");
    });
    JsFuture::from(timer).await.expect("timer fired");
}

#[wasm_bindgen_test]
async fn board_starts_only_after_tone_resumes() {
    install_fake_tone();
    let board = SoundBoard::new(ToneEngine::default());

    board.play(Cue::Click);
    assert!(!board.is_started());
    settle().await;
    assert!(!board.is_started(), "a rejected start must not mark the board started");
    assert!(played().is_empty());

    allow_start();
    board.play(Cue::Success);
    assert!(!board.is_started(), "still waiting on the resume promise");
    settle().await;
    assert_eq!(starts(), 2.0);
    assert_eq!(played(), vec!["G4/8n".to_string()]);

    board.play(Cue::Click);
    assert!(board.is_started());
    assert_eq!(starts(), 2.0);
    assert_eq!(played(), vec!["G4/8n".to_string(), "C5/64n".to_string()]);
}
