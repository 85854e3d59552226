#![forbid(unsafe_code)]
//! Browser bindings for the Manual Pitstop site controls.
//!
//! Page scripts call the camelCase exports below; each one forwards to the
//! page's [`session::PageSession`].

use js_sys::Array;
use pitstop_core::{Cue, CuePlayer, StorageOp, Theme, parse_params};
use serde::Serialize;
use std::collections::VecDeque;
use wasm_bindgen::prelude::*;

pub mod a11y;
pub mod audio;
pub mod config;
pub mod dom;
pub mod logging;
pub mod navigation;
pub mod session;
pub mod speech;
pub mod storage;
pub mod theme;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
    let session = session::current();
    audio::start_on_first_click(session.sounds());
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or_else(|err| {
            log::error!("Could not convert value for JavaScript: {err}");
            JsValue::NULL
        })
}

/// Read (`value` omitted), remove (`null`) or write a JSON preference.
///
/// Returns the stored or written value, or `null`.
#[wasm_bindgen(js_name = localStorageManager)]
pub fn local_storage_manager(key: &str, value: JsValue) -> JsValue {
    let op = if value.is_undefined() {
        StorageOp::Read
    } else if value.is_null() {
        StorageOp::Remove
    } else {
        match serde_wasm_bindgen::from_value(value) {
            Ok(json) => StorageOp::Write(json),
            Err(err) => {
                log::error!("Error saving item '{key}' to storage: {err}");
                return JsValue::NULL;
            }
        }
    };
    session::current()
        .prefs()
        .read_or_write(key, op)
        .map_or(JsValue::NULL, |json| to_js(&json))
}

#[wasm_bindgen(js_name = playSound)]
pub fn play_sound(kind: &str) {
    session::current().sounds().play(Cue::from_name(kind));
}

/// Pick an emoji from `pool` not present in `used`, updating `used` in place.
#[wasm_bindgen(js_name = getUniqueEmoji)]
pub fn get_unique_emoji(pool: &Array, used: &Array) -> String {
    let pool: Vec<String> = pool.iter().filter_map(|item| item.as_string()).collect();
    let mut recent: VecDeque<String> = used.iter().filter_map(|item| item.as_string()).collect();
    let choice = session::current().unique_emoji(&pool, &mut recent);
    used.set_length(0);
    for emoji in &recent {
        used.push(&JsValue::from_str(emoji));
    }
    choice
}

#[wasm_bindgen(js_name = applyTheme)]
pub fn apply_theme(theme: &str, toggle_id: Option<String>) {
    match theme.parse::<Theme>() {
        Ok(theme) => session::current().apply_theme(theme, toggle_id.as_deref()),
        Err(err) => log::error!("{err}"),
    }
}

/// Returns the applied theme name.
#[wasm_bindgen(js_name = initializeThemeManager)]
pub fn initialize_theme_manager(toggle_id: &str) -> String {
    session::current().initialize_themes(toggle_id).to_string()
}

/// Returns the applied percentage.
#[wasm_bindgen(js_name = adjustFontSize)]
pub fn adjust_font_size(delta: f64) -> f64 {
    session::current().adjust_font(delta)
}

#[wasm_bindgen(js_name = readPageContent)]
pub fn read_page_content() {
    session::current().read_page();
}

#[wasm_bindgen(js_name = initializeAccessibilityControls)]
pub fn initialize_accessibility_controls(
    increase_id: &str,
    decrease_id: &str,
    read_id: &str,
    container_id: &str,
) {
    session::current().initialize_accessibility(increase_id, decrease_id, read_id, container_id);
}

/// `params` may be omitted, an object, or a JSON string. Returns whether the section is shown.
#[wasm_bindgen(js_name = showSection)]
pub fn show_section(id: &str, params: JsValue) -> bool {
    let params = if let Some(raw) = params.as_string() {
        parse_params(Some(&raw))
    } else if params.is_undefined() || params.is_null() {
        parse_params(None)
    } else {
        serde_wasm_bindgen::from_value(params).unwrap_or_else(|err| {
            log::error!("Failed to read navigation params: {err}");
            parse_params(None)
        })
    };
    session::current().show_section(id, params)
}

#[wasm_bindgen(js_name = initializeNavigation)]
pub fn initialize_navigation() {
    session::current().initialize_navigation();
}
