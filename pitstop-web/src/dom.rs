use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, CssStyleDeclaration, Document, Element, Event, EventTarget,
    HtmlElement, Window,
};

/// Retrieve the global `window` object, if running in a browser.
#[must_use]
pub fn window() -> Option<Window> {
    web_sys::window()
}

/// Retrieve the document object for DOM interactions.
#[must_use]
pub fn document() -> Option<Document> {
    window()?.document()
}

/// The `<html>` element.
#[must_use]
pub fn root_element() -> Option<Element> {
    document()?.document_element()
}

#[must_use]
pub fn body() -> Option<HtmlElement> {
    document()?.body()
}

#[must_use]
pub fn element_by_id(id: &str) -> Option<Element> {
    document()?.get_element_by_id(id)
}

#[must_use]
pub fn html_element_by_id(id: &str) -> Option<HtmlElement> {
    element_by_id(id)?.dyn_into::<HtmlElement>().ok()
}

/// Every element matching `selector`, in document order.
#[must_use]
pub fn query_all(scope: &Element, selector: &str) -> Vec<Element> {
    let Ok(list) = scope.query_selector_all(selector) else {
        log::error!("Invalid selector '{selector}'");
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|idx| list.get(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Whether a global named `name` exists on `window`.
#[must_use]
pub fn has_global(name: &str) -> bool {
    window().is_some_and(|win| Reflect::has(&win, &JsValue::from_str(name)).unwrap_or(false))
}

#[must_use]
pub fn computed_style(element: &Element) -> Option<CssStyleDeclaration> {
    window()?.get_computed_style(element).ok().flatten()
}

/// Neither `display:none` nor `visibility:hidden` in the computed style.
#[must_use]
pub fn is_rendered(element: &Element) -> bool {
    computed_style(element).is_none_or(|style| {
        let display = style.get_property_value("display").unwrap_or_default();
        let visibility = style.get_property_value("visibility").unwrap_or_default();
        display != "none" && visibility != "hidden"
    })
}

/// Parse a computed CSS length such as `"16px"`.
#[must_use]
pub fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Attach a click listener that lives as long as the page.
///
/// # Errors
/// Returns an error if the browser rejects the listener.
pub fn on_click(target: &EventTarget, handler: impl FnMut(Event) + 'static) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Attach a click listener that the browser removes after its first run.
///
/// # Errors
/// Returns an error if the browser rejects the listener.
pub fn on_first_click(
    target: &EventTarget,
    handler: impl FnOnce() + 'static,
) -> Result<(), JsValue> {
    let options = AddEventListenerOptions::new();
    options.set_once(true);
    let callback = Closure::once_into_js(handler);
    target.add_event_listener_with_callback_and_add_event_listener_options(
        "click",
        callback.unchecked_ref(),
        &options,
    )
}

/// Run `callback` once after `duration_ms`.
///
/// # Errors
/// Returns an error if no window is available or the timer cannot be scheduled.
pub fn set_timeout(duration_ms: i32, callback: impl FnOnce() + 'static) -> Result<i32, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("`window` unavailable"))?;
    let callback = Closure::once_into_js(callback);
    win.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), duration_ms)
}
