//! Section visibility, scrolling, AOS refresh and the `sectionShown` event.

use crate::dom::{
    document, element_by_id, has_global, js_error_message, on_click, query_all, window,
};
use js_sys::{Function, Reflect};
use pitstop_core::navigation::{
    HIDDEN_CLASS, PARAMS_ATTRIBUTE, SECTION_SHOWN_EVENT, TARGET_ATTRIBUTE,
};
use pitstop_core::{NavTrigger, SectionId, SectionShown, SectionView};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomEvent, CustomEventInit, Element, Event, ScrollBehavior, ScrollToOptions};

#[derive(Debug, Clone, Copy, Default)]
pub struct DomSectionView;

impl SectionView for DomSectionView {
    fn contains(&self, id: &SectionId) -> bool {
        element_by_id(id.as_str()).is_some()
    }

    fn is_hidden(&self, id: &SectionId) -> bool {
        element_by_id(id.as_str()).is_none_or(|el| el.class_list().contains(HIDDEN_CLASS))
    }

    fn set_hidden(&self, id: &SectionId, hidden: bool) {
        let Some(element) = element_by_id(id.as_str()) else {
            return;
        };
        let classes = element.class_list();
        let result = if hidden {
            classes.add_1(HIDDEN_CLASS)
        } else {
            classes.remove_1(HIDDEN_CLASS)
        };
        if let Err(err) = result {
            log::warn!("Could not toggle visibility of '{id}': {}", js_error_message(&err));
        }
    }

    fn scroll_to_top(&self) {
        let Some(win) = window() else {
            return;
        };
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        win.scroll_to_with_scroll_to_options(&options);
    }

    fn refresh_animations(&self) {
        if !has_global("AOS") {
            return;
        }
        if let Err(err) = refresh_aos() {
            log::warn!("AOS refresh failed: {}", js_error_message(&err));
        }
    }

    fn announce(&self, shown: &SectionShown) {
        if let Err(err) = dispatch_section_shown(shown) {
            log::error!("Could not dispatch {SECTION_SHOWN_EVENT}: {}", js_error_message(&err));
        }
    }
}

fn refresh_aos() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("`window` unavailable"))?;
    let aos = Reflect::get(&win, &JsValue::from_str("AOS"))?;
    let refresh: Function = Reflect::get(&aos, &JsValue::from_str("refreshHard"))?.dyn_into()?;
    refresh.call0(&aos)?;
    Ok(())
}

fn dispatch_section_shown(shown: &SectionShown) -> Result<(), JsValue> {
    let doc = document().ok_or_else(|| JsValue::from_str("`document` unavailable"))?;
    let detail = shown
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let init = CustomEventInit::new();
    init.set_detail(&detail);
    let event = CustomEvent::new_with_event_init_dict(SECTION_SHOWN_EVENT, &init)?;
    doc.dispatch_event(&event)?;
    Ok(())
}

/// Decode the trigger for a click on a control carrying `marker`.
fn trigger_from_event(marker: &str, event: &Event) -> Option<NavTrigger> {
    let control = event.current_target()?.dyn_into::<Element>().ok()?;
    let target = control.get_attribute(TARGET_ATTRIBUTE);
    let params = control.get_attribute(PARAMS_ATTRIBUTE);
    NavTrigger::from_marker(marker, target.as_deref(), params.as_deref())
}

/// Attach `on_trigger` to every control carrying one of `markers`.
pub fn wire_controls(markers: &[&'static str], on_trigger: impl Fn(NavTrigger) + Clone + 'static) {
    let Some(root) = document().and_then(|doc| doc.document_element()) else {
        return;
    };
    for &marker in markers {
        for control in query_all(&root, &format!(".{marker}")) {
            let on_trigger = on_trigger.clone();
            let wired = on_click(&control, move |event| {
                if let Some(trigger) = trigger_from_event(marker, &event) {
                    on_trigger(trigger);
                }
            });
            if let Err(err) = wired {
                log::error!("Could not wire .{marker}: {}", js_error_message(&err));
            }
        }
    }
}
