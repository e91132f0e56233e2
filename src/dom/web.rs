//! The live browser DOM behind the [`Document`] and [`Element`] traits.

use wasm_bindgen::JsCast;
use web_sys::{HtmlDocument, HtmlFormElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, Window};

use super::{Document, Element};

#[derive(Debug, Clone)]
pub struct WebElement(web_sys::Element);

impl From<web_sys::Element> for WebElement {
    fn from(element: web_sys::Element) -> Self {
        Self(element)
    }
}

impl WebElement {
    pub fn raw(&self) -> &web_sys::Element {
        &self.0
    }
}

fn collect(list: Result<web_sys::NodeList, wasm_bindgen::JsValue>) -> Vec<WebElement> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|index| list.get(index))
        .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
        .map(WebElement)
        .collect()
}

impl Element for WebElement {
    fn tag_name(&self) -> String {
        self.0.tag_name().to_ascii_lowercase()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attr(&self, name: &str, value: &str) {
        let _ = self.0.set_attribute(name, value);
    }

    fn remove_attr(&self, name: &str) {
        let _ = self.0.remove_attribute(name);
    }

    fn add_class(&self, class: &str) {
        let _ = self.0.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.0.class_list().remove_1(class);
    }

    fn inner_html(&self) -> String {
        self.0.inner_html()
    }

    fn set_inner_html(&self, html: &str) {
        self.0.set_inner_html(html);
    }

    fn text(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }

    fn value(&self) -> String {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = self.0.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            self.attr("value").unwrap_or_default()
        }
    }

    fn set_value(&self, value: &str) {
        if let Some(input) = self.0.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(area) = self.0.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(select) = self.0.dyn_ref::<HtmlSelectElement>() {
            select.set_value(value);
        } else {
            self.set_attr("value", value);
        }
    }

    fn is_checked(&self) -> bool {
        self.0
            .dyn_ref::<HtmlInputElement>()
            .is_some_and(|input| input.checked())
    }

    fn reset(&self) {
        if let Some(form) = self.0.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn matches(&self, selector: &str) -> bool {
        self.0.matches(selector).unwrap_or(false)
    }

    fn closest(&self, selector: &str) -> Option<Self> {
        self.0.closest(selector).ok().flatten().map(Self)
    }

    fn query_all(&self, selector: &str) -> Vec<Self> {
        collect(self.0.query_selector_all(selector))
    }

    fn is_connected(&self) -> bool {
        self.0.is_connected()
    }

    fn remove(&self) {
        self.0.remove();
    }
}

pub struct WebDocument {
    window: Window,
    document: web_sys::Document,
}

impl WebDocument {
    pub fn new(window: Window, document: web_sys::Document) -> Self {
        Self { window, document }
    }
}

impl Document for WebDocument {
    type Element = WebElement;

    fn query_all(&self, selector: &str) -> Vec<WebElement> {
        collect(self.document.query_selector_all(selector))
    }

    fn append_to_body(&self, html: &str) -> Option<WebElement> {
        let body = self.document.body()?;
        let holder = self.document.create_element("div").ok()?;
        holder.set_inner_html(html);
        let element = holder.first_element_child()?;
        body.append_child(&element).ok()?;
        Some(WebElement(element))
    }

    fn cookie(&self) -> String {
        self.document
            .dyn_ref::<HtmlDocument>()
            .and_then(|document| document.cookie().ok())
            .unwrap_or_default()
    }

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn navigate(&self, url: &str) {
        let _ = self.window.location().set_href(url);
    }

    fn reload(&self) {
        let _ = self.window.location().reload();
    }

    fn viewport_width(&self) -> u32 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .map(|width| width as u32)
            .unwrap_or(0)
    }
}
