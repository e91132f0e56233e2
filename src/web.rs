//! Browser entry point.

use std::rc::Rc;

use chrono::Local;
use js_sys::{Array, Function, Object, Reflect};
use tracing::{error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Window;

use crate::app::{DomEvent, EventKind, route};
use crate::dom::web::{WebDocument, WebElement};
use crate::handlers::{initialize, run};
use crate::layout::{duration_minutes, event_position, format_event_time, parse_timestamp, truncate_text};
use crate::state::{AppState, Tooltips};
use crate::telemetry;
use crate::timer::BrowserTimer;
use crate::transport::HttpTransport;

/// `new bootstrap.Tooltip(element)` when Bootstrap is on the page.
struct BootstrapTooltips {
    constructor: Function,
}

impl BootstrapTooltips {
    fn detect(window: &Window) -> Option<Self> {
        let bootstrap = Reflect::get(window.as_ref(), &JsValue::from_str("bootstrap")).ok()?;
        if bootstrap.is_undefined() || bootstrap.is_null() {
            return None;
        }
        let constructor = Reflect::get(&bootstrap, &JsValue::from_str("Tooltip")).ok()?;
        constructor.dyn_into::<Function>().ok().map(|constructor| Self { constructor })
    }
}

impl Tooltips<WebElement> for BootstrapTooltips {
    fn attach(&self, element: &WebElement) {
        let args = Array::of1(element.raw().as_ref());
        if let Err(err) = Reflect::construct(&self.constructor, &args) {
            warn!(?err, "tooltip construction failed");
        }
    }
}

fn listen(document: &web_sys::Document, state: &AppState<WebDocument>, kind: EventKind) {
    let state = state.clone();
    let handler = Closure::wrap(Box::new(move |event: web_sys::Event| {
        let Some(target) = event
            .target()
            .and_then(|target| target.dyn_into::<web_sys::Element>().ok())
        else {
            return;
        };
        let dispatch = route(&state, &DomEvent::new(kind, WebElement::from(target)));
        if dispatch.prevent_default {
            event.prevent_default();
        }
        for action in dispatch.actions {
            let state = state.clone();
            spawn_local(async move { run(&state, action).await });
        }
    }) as Box<dyn FnMut(web_sys::Event)>);
    if let Err(err) = document.add_event_listener_with_callback(kind.dom_type(), handler.as_ref().unchecked_ref()) {
        error!(kind = kind.dom_type(), ?err, "failed to install delegated listener");
        return;
    }
    handler.forget();
}

#[wasm_bindgen(start)]
pub fn start() {
    if let Err(err) = telemetry::init() {
        web_sys::console::warn_1(&JsValue::from_str(&format!("calendar logging unavailable: {err}")));
    }

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    // hrefs and form actions resolve against the page, not the site root
    let page_url = window.location().href().unwrap_or_default();
    let transport = match HttpTransport::new(&page_url) {
        Ok(transport) => transport,
        Err(err) => {
            error!("calendar binder disabled: {err}");
            return;
        }
    };

    let doc = Rc::new(WebDocument::new(window.clone(), document.clone()));
    let mut state = AppState::new(doc, Rc::new(transport), Rc::new(BrowserTimer));
    if let Some(tooltips) = BootstrapTooltips::detect(&window) {
        state = state.with_tooltips(Rc::new(tooltips));
    }

    for kind in EventKind::ALL {
        listen(&document, &state, kind);
    }

    spawn_local(async move { initialize(&state, Local::now().date_naive()).await });
}

#[wasm_bindgen(js_name = formatEventTime)]
pub fn format_event_time_js(start: &str, end: &str) -> Option<String> {
    Some(format_event_time(&parse_timestamp(start)?, &parse_timestamp(end)?))
}

/// `{top, height}` as CSS percentages, or `null` for an unreadable start.
#[wasm_bindgen(js_name = getEventPosition)]
pub fn event_position_js(start: &str, minutes: f64) -> JsValue {
    let Some(start) = parse_timestamp(start) else {
        return JsValue::NULL;
    };
    let position = event_position(&start, minutes);
    let out = Object::new();
    let _ = Reflect::set(&out, &JsValue::from_str("top"), &JsValue::from_str(&position.css_top()));
    let _ = Reflect::set(&out, &JsValue::from_str("height"), &JsValue::from_str(&position.css_height()));
    out.into()
}

#[wasm_bindgen(js_name = eventDurationMinutes)]
pub fn duration_minutes_js(start: &str, end: &str) -> Option<f64> {
    Some(duration_minutes(&parse_timestamp(start)?, &parse_timestamp(end)?))
}

#[wasm_bindgen(js_name = truncateText)]
pub fn truncate_text_js(text: &str, max_length: usize) -> String {
    truncate_text(text, max_length)
}
