// Accessibility controls: root font size, read-aloud button, alerts

use crate::dom::{
    computed_style, is_rendered, js_error_message, parse_px, query_all, root_element, window,
};
use pitstop_core::{Affordance, Alerts, FontSink, ReadControl, TextBlock, percent_style};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

/// Reads the computed root font size and writes an inline percentage.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomFontSink;

impl FontSink for DomFontSink {
    fn root_font_px(&self) -> Option<f64> {
        let root = root_element()?;
        let size = computed_style(&root)?.get_property_value("font-size").ok()?;
        parse_px(&size)
    }

    fn set_root_font_percent(&self, percent: f64) {
        let Some(root) = root_element().and_then(|el| el.dyn_into::<HtmlElement>().ok()) else {
            return;
        };
        if let Err(err) = root.style().set_property("font-size", &percent_style(percent)) {
            log::error!("Could not set root font size: {}", js_error_message(&err));
        }
    }
}

/// The read/stop button. Absent buttons make every call a no-op.
#[derive(Debug, Clone, Default)]
pub struct DomReadControl {
    button: Option<HtmlElement>,
}

impl DomReadControl {
    #[must_use]
    pub const fn new(button: Option<HtmlElement>) -> Self {
        Self { button }
    }
}

impl ReadControl for DomReadControl {
    fn show(&self, affordance: Affordance) {
        let Some(button) = &self.button else {
            return;
        };
        button.set_inner_html(affordance.icon());
        let _ = button.set_attribute("aria-label", affordance.aria_label());
        let _ = button.set_attribute("title", affordance.title());
    }

    fn hide(&self) {
        if let Some(button) = &self.button {
            let _ = button.style().set_property("display", "none");
        }
    }
}

/// `window.alert`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserAlerts;

impl Alerts for BrowserAlerts {
    fn alert(&self, message: &str) {
        if let Some(win) = window() {
            let _ = win.alert_with_message(message);
        }
    }
}

/// Snapshot every element under `container` that matches `selectors`.
#[must_use]
pub fn collect_blocks(container: &Element, selectors: &str) -> Vec<TextBlock> {
    query_all(container, selectors)
        .into_iter()
        .map(|element| TextBlock {
            tag: element.tag_name(),
            text: element.text_content().unwrap_or_default(),
            visible: is_rendered(&element),
            parent_visible: element.parent_element().as_ref().is_none_or(is_rendered),
        })
        .collect()
}
