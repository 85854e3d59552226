#![cfg(target_arch = "wasm32")]

use js_sys::{Array, Reflect};
use pitstop_core::config::{DETAILS_SECTION_ID, MENU_SECTION_ID, SECTION_IDS};
use pitstop_web::dom;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;
use web_sys::{CustomEvent, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn ensure_element(tag: &str, id: &str) -> Element {
    let doc = dom::document().expect("document");
    if let Some(existing) = doc.get_element_by_id(id) {
        return existing;
    }
    let element = doc.create_element(tag).expect("create element");
    element.set_id(id);
    doc.body()
        .expect("document body")
        .append_child(&element)
        .expect("append element");
    element
}

fn mount_sections() -> Vec<&'static str> {
    let ids = vec![MENU_SECTION_ID, DETAILS_SECTION_ID, SECTION_IDS[2]];
    for (idx, id) in ids.iter().enumerate() {
        let section = ensure_element("section", id);
        let classes = section.class_list();
        if idx == 0 {
            classes.remove_1("hidden").expect("unhide");
        } else {
            classes.add_1("hidden").expect("hide");
        }
    }
    ids
}

fn visible(ids: &[&str]) -> Vec<String> {
    ids.iter()
        .filter(|id| {
            dom::element_by_id(id).is_some_and(|el| !el.class_list().contains("hidden"))
        })
        .map(ToString::to_string)
        .collect()
}

#[wasm_bindgen_test]
fn show_section_leaves_exactly_the_target_visible() {
    let ids = mount_sections();
    assert!(pitstop_web::show_section(DETAILS_SECTION_ID, JsValue::UNDEFINED));
    assert_eq!(visible(&ids), vec![DETAILS_SECTION_ID.to_string()]);

    assert!(pitstop_web::show_section(MENU_SECTION_ID, JsValue::UNDEFINED));
    assert_eq!(visible(&ids), vec![MENU_SECTION_ID.to_string()]);
}

#[wasm_bindgen_test]
fn show_section_with_unknown_id_changes_nothing() {
    let ids = mount_sections();
    let before = visible(&ids);
    assert!(!pitstop_web::show_section("nonexistent-id", JsValue::UNDEFINED));
    assert_eq!(visible(&ids), before);
}

#[wasm_bindgen_test]
fn section_shown_event_carries_id_and_params() {
    mount_sections();
    let seen: Rc<RefCell<Option<JsValue>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
        let custom: CustomEvent = event.unchecked_into();
        sink.replace(Some(custom.detail()));
    });
    let doc = dom::document().expect("document");
    doc.add_event_listener_with_callback("sectionShown", listener.as_ref().unchecked_ref())
        .expect("listen");

    assert!(pitstop_web::show_section(
        DETAILS_SECTION_ID,
        JsValue::from_str(r#"{"from":"menu"}"#)
    ));

    let detail = seen.borrow().clone().expect("event dispatched");
    let section = Reflect::get(&detail, &JsValue::from_str("sectionId")).expect("sectionId");
    assert_eq!(section.as_string().as_deref(), Some(DETAILS_SECTION_ID));
    let params = Reflect::get(&detail, &JsValue::from_str("params")).expect("params");
    let from = Reflect::get(&params, &JsValue::from_str("from")).expect("from");
    assert_eq!(from.as_string().as_deref(), Some("menu"));

    doc.remove_event_listener_with_callback("sectionShown", listener.as_ref().unchecked_ref())
        .expect("unlisten");
}

#[wasm_bindgen_test]
fn local_storage_manager_round_trips_preferences() {
    pitstop_web::local_storage_manager("fontSize", JsValue::from_f64(120.0));
    let size = pitstop_web::local_storage_manager("fontSize", JsValue::UNDEFINED);
    assert_eq!(size.as_f64(), Some(120.0));

    pitstop_web::local_storage_manager("theme", JsValue::from_str("dark"));
    let theme = pitstop_web::local_storage_manager("theme", JsValue::UNDEFINED);
    assert_eq!(theme.as_string().as_deref(), Some("dark"));

    pitstop_web::local_storage_manager("theme", JsValue::NULL);
    assert!(pitstop_web::local_storage_manager("theme", JsValue::UNDEFINED).is_null());
}

#[wasm_bindgen_test]
fn font_size_clamps_at_both_bounds() {
    let mut last = 0.0;
    for _ in 0..10 {
        last = pitstop_web::adjust_font_size(10.0);
    }
    assert!((last - 140.0).abs() < f64::EPSILON);
    for _ in 0..12 {
        last = pitstop_web::adjust_font_size(-10.0);
    }
    assert!((last - 60.0).abs() < f64::EPSILON);

    let root: HtmlElement = dom::root_element()
        .expect("root")
        .dyn_into()
        .expect("html element");
    assert_eq!(root.style().get_property_value("font-size").expect("style"), "60%");
    pitstop_web::local_storage_manager("fontSize", JsValue::NULL);
    root.style().remove_property("font-size").expect("reset");
}

#[wasm_bindgen_test]
fn theme_toggle_twice_restores_attribute() {
    let toggle: HtmlElement = ensure_element("button", "theme-toggle")
        .dyn_into()
        .expect("button");
    let initial = pitstop_web::initialize_theme_manager("theme-toggle");
    let root = dom::root_element().expect("root");
    assert_eq!(root.get_attribute("data-theme"), Some(initial.clone()));

    toggle.click();
    assert_ne!(root.get_attribute("data-theme"), Some(initial.clone()));
    toggle.click();
    assert_eq!(root.get_attribute("data-theme"), Some(initial));
    pitstop_web::local_storage_manager("theme", JsValue::NULL);
}

#[wasm_bindgen_test]
fn unique_emoji_covers_small_pool_before_repeating() {
    let pool: Array = ["🚀", "🏁", "🔧"].iter().map(|e| JsValue::from_str(e)).collect();
    let used = Array::new();
    let picks: HashSet<String> = (0..3)
        .map(|_| pitstop_web::get_unique_emoji(&pool, &used))
        .collect();
    assert_eq!(picks.len(), 3);
    assert_eq!(used.length(), 3);

    pitstop_web::get_unique_emoji(&pool, &used);
    assert_eq!(used.length(), 1, "history resets once the pool is exhausted");
}

#[wasm_bindgen_test]
fn collect_blocks_flags_hidden_elements_and_hidden_parents() {
    let container = ensure_element("div", "read-aloud-fixture");
    container.set_inner_html(concat!(
        "<p id=\"shown\">Pit lane open</p>",
        "<p id=\"invisible\" style=\"visibility:hidden\">Invisible note</p>",
        "<div style=\"display:none\"><p id=\"nested\">Behind a hidden parent</p></div>",
        "<span style=\"display:none\">Collapsed span</span>",
    ));

    let blocks = pitstop_web::a11y::collect_blocks(&container, "p, span");
    let flags: Vec<(&str, bool, bool)> = blocks
        .iter()
        .map(|b| (b.text.as_str(), b.visible, b.parent_visible))
        .collect();
    assert_eq!(
        flags,
        vec![
            ("Pit lane open", true, true),
            ("Invisible note", false, true),
            ("Behind a hidden parent", true, false),
            ("Collapsed span", false, true),
        ]
    );
    assert_eq!(
        pitstop_core::compose_reading(&blocks).as_deref(),
        Some("Pit lane open.")
    );
    container.remove();
}
