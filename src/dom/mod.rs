//! Document access for the binder.
//!
//! Handlers only ever talk to the page through [`Document`] and [`Element`],
//! so the same code drives the live browser DOM (`web`, wasm only) and the
//! in-memory document used natively ([`memory`]).

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::fmt;

pub use memory::{MemoryDocument, MemoryElement};

/// A handle to one element. Handles are cheap to clone and stay valid after
/// the element is detached; [`Element::is_connected`] tells the two apart.
pub trait Element: Clone + fmt::Debug + 'static {
    fn tag_name(&self) -> String;
    fn attr(&self, name: &str) -> Option<String>;
    fn set_attr(&self, name: &str, value: &str);
    fn remove_attr(&self, name: &str);

    fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|value| value.split_ascii_whitespace().any(|c| c == class))
    }

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);

    /// Returns whether the class is present afterwards.
    fn toggle_class(&self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    fn set_class_name(&self, value: &str) {
        self.set_attr("class", value);
    }

    fn inner_html(&self) -> String;
    fn set_inner_html(&self, html: &str);
    fn text(&self) -> String;
    fn set_text(&self, text: &str);

    fn is_disabled(&self) -> bool {
        self.has_attr("disabled")
    }

    fn set_disabled(&self, disabled: bool) {
        if disabled {
            self.set_attr("disabled", "");
        } else {
            self.remove_attr("disabled");
        }
    }

    /// Current value of a form control.
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    fn is_checked(&self) -> bool;

    /// Restores every control of a form to its markup default.
    fn reset(&self);

    fn matches(&self, selector: &str) -> bool;
    fn closest(&self, selector: &str) -> Option<Self>;
    fn query(&self, selector: &str) -> Option<Self> {
        self.query_all(selector).into_iter().next()
    }
    fn query_all(&self, selector: &str) -> Vec<Self>;

    fn is_connected(&self) -> bool;
    fn remove(&self);
}

/// The page: element lookup plus the window-level effects handlers need.
pub trait Document: 'static {
    type Element: Element;

    fn query(&self, selector: &str) -> Option<Self::Element> {
        self.query_all(selector).into_iter().next()
    }
    fn query_all(&self, selector: &str) -> Vec<Self::Element>;

    /// Parses `html`, appends its first element to the body and returns it.
    fn append_to_body(&self, html: &str) -> Option<Self::Element>;

    /// Raw `document.cookie` string.
    fn cookie(&self) -> String;

    /// Absolute URL of the current page.
    fn location(&self) -> String;
    fn navigate(&self, url: &str);
    fn reload(&self);
    fn viewport_width(&self) -> u32;
}

/// Name/value pairs a form would submit, in document order.
///
/// Nameless, disabled, button-like and unchecked checkable controls are
/// skipped, as the browser does when it builds `FormData`.
pub fn form_fields<E: Element>(form: &E) -> Vec<(String, String)> {
    form.query_all("input, select, textarea")
        .into_iter()
        .filter(|control| !control.is_disabled())
        .filter_map(|control| {
            let name = control.attr("name").filter(|name| !name.is_empty())?;
            if control.tag_name().eq_ignore_ascii_case("input") {
                let kind = control.attr("type").unwrap_or_default().to_ascii_lowercase();
                match kind.as_str() {
                    "submit" | "button" | "reset" | "image" | "file" => return None,
                    "checkbox" | "radio" if !control.is_checked() => return None,
                    "checkbox" | "radio" => {
                        let value = control.attr("value").unwrap_or_else(|| "on".to_string());
                        return Some((name, value));
                    }
                    _ => {}
                }
            }
            Some((name, control.value()))
        })
        .collect()
}

/// Value of one cookie, percent-decoded.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies.split(';').find_map(|cookie| {
        let (key, value) = cookie.trim().split_once('=')?;
        if key != name {
            return None;
        }
        let literal_plus = value.replace('+', "%2B");
        let decoded: String = url::form_urlencoded::parse(format!("v={literal_plus}").as_bytes())
            .next()
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();
        Some(decoded)
    })
}

/// Quotes a value for use inside `[attr="…"]`.
pub fn quote_attribute_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
