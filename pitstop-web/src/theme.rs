//! Root `data-theme` attribute, toggle icon and system preference.

use crate::dom::{
    body, html_element_by_id, js_error_message, on_click, root_element, set_timeout, window,
};
use pitstop_core::theme::THEME_ATTRIBUTE;
use pitstop_core::{SystemTheme, Theme, ThemeSink};
use web_sys::HtmlElement;

#[derive(Debug, Clone, Default)]
pub struct DomThemeSink {
    toggle: Option<HtmlElement>,
}

impl DomThemeSink {
    /// Sink that swaps the icon inside the element with id `toggle_id`, if any.
    #[must_use]
    pub fn new(toggle_id: Option<&str>) -> Self {
        Self {
            toggle: toggle_id.and_then(html_element_by_id),
        }
    }

    #[must_use]
    pub const fn toggle(&self) -> Option<&HtmlElement> {
        self.toggle.as_ref()
    }
}

impl ThemeSink for DomThemeSink {
    fn current_theme(&self) -> Option<Theme> {
        root_element()?.get_attribute(THEME_ATTRIBUTE)?.parse().ok()
    }

    fn set_theme_attribute(&self, theme: Theme) {
        let Some(root) = root_element() else {
            return;
        };
        if let Err(err) = root.set_attribute(THEME_ATTRIBUTE, theme.as_str()) {
            log::error!("Could not set theme attribute: {}", js_error_message(&err));
        }
    }

    fn set_toggle_icon(&self, icon: &str) {
        if let Some(toggle) = &self.toggle {
            toggle.set_inner_html(icon);
        }
    }

    fn flash_transition(&self, class: &str, duration_ms: u32) {
        let Some(body) = body() else {
            return;
        };
        if body.class_list().add_1(class).is_err() {
            return;
        }
        let class = class.to_string();
        let delay = i32::try_from(duration_ms).unwrap_or(i32::MAX);
        if let Err(err) = set_timeout(delay, move || {
            let _ = body.class_list().remove_1(&class);
        }) {
            log::warn!("Could not schedule theme transition end: {}", js_error_message(&err));
        }
    }
}

/// `prefers-color-scheme` media query.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaSystemTheme;

impl SystemTheme for MediaSystemTheme {
    fn prefers_dark(&self) -> bool {
        window()
            .and_then(|win| win.match_media("(prefers-color-scheme: dark)").ok().flatten())
            .is_some_and(|query| query.matches())
    }
}

/// Route clicks on the theme toggle to `on_toggle`.
pub fn wire_toggle(sink: &DomThemeSink, on_toggle: impl Fn() + 'static) {
    let Some(toggle) = sink.toggle() else {
        return;
    };
    if let Err(err) = on_click(toggle, move |_| on_toggle()) {
        log::error!("Could not wire theme toggle: {}", js_error_message(&err));
    }
}
