//! In-memory document: a `scraper` tree mutated in place, with selectors
//! parsed and matched by `scraper` itself.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use ego_tree::{NodeId, NodeRef, Tree};
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::Text;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::warn;

use super::{Document, Element};

/// The parsed tree plus per-control state that never shows in markup.
struct Page {
    html: RefCell<Html>,
    values: RefCell<HashMap<NodeId, String>>,
    checked: RefCell<HashMap<NodeId, bool>>,
}

impl Page {
    fn element(self: &Rc<Self>, id: NodeId) -> MemoryElement {
        MemoryElement {
            page: Rc::clone(self),
            id,
        }
    }

    fn elements(self: &Rc<Self>, ids: Vec<NodeId>) -> Vec<MemoryElement> {
        ids.into_iter().map(|id| self.element(id)).collect()
    }
}

#[derive(Clone)]
pub struct MemoryElement {
    page: Rc<Page>,
    id: NodeId,
}

impl fmt::Debug for MemoryElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.with_ref(|element| {
            let mut out = format!("<{}", element.value().name());
            for (name, value) in element.value().attrs() {
                out.push_str(&format!(" {name}=\"{value}\""));
            }
            out
        });
        write!(f, "{}>", summary.unwrap_or_else(|| "<?".to_string()))
    }
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(selector, "invalid selector: {err}");
            None
        }
    }
}

fn attribute_name(name: &str) -> QualName {
    QualName::new(None, Namespace::from(""), LocalName::from(name.to_ascii_lowercase()))
}

fn matching_ids<'a>(nodes: impl Iterator<Item = NodeRef<'a, Node>>, selector: &Selector) -> Vec<NodeId> {
    nodes
        .filter_map(ElementRef::wrap)
        .filter(|element| selector.matches(element))
        .map(|element| element.id())
        .collect()
}

fn detach_children(tree: &mut Tree<Node>, id: NodeId) {
    let children: Vec<NodeId> = tree
        .get(id)
        .map(|node| node.children().map(|child| child.id()).collect())
        .unwrap_or_default();
    for child in children {
        if let Some(mut child) = tree.get_mut(child) {
            child.detach();
        }
    }
}

/// Copies the children of `source`, from another tree, under `target`.
fn graft(tree: &mut Tree<Node>, target: NodeId, source: NodeRef<'_, Node>) {
    for child in source.children() {
        let Some(mut parent) = tree.get_mut(target) else {
            return;
        };
        let copy = parent.append(child.value().clone()).id();
        graft(tree, copy, child);
    }
}

impl MemoryElement {
    fn with_ref<R>(&self, read: impl FnOnce(ElementRef<'_>) -> R) -> Option<R> {
        let html = self.page.html.borrow();
        let node = html.tree.get(self.id)?;
        ElementRef::wrap(node).map(read)
    }

    fn is_tag(&self, tag: &str) -> bool {
        self.with_ref(|element| element.value().name() == tag)
            .unwrap_or(false)
    }

    /// Rebuilds the element with edited attributes, so `scraper`'s cached id
    /// and class lookups stay in step.
    fn edit_attrs(&self, edit: impl FnOnce(&mut Vec<Attribute>)) {
        let mut html = self.page.html.borrow_mut();
        let Some(mut node) = html.tree.get_mut(self.id) else {
            return;
        };
        let Node::Element(element) = node.value() else {
            return;
        };
        let mut attrs: Vec<Attribute> = element
            .attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        edit(&mut attrs);
        let name = element.name.clone();
        *element = scraper::node::Element::new(name, attrs);
    }

    fn descendant_ids(&self) -> Vec<NodeId> {
        let html = self.page.html.borrow();
        html.tree
            .get(self.id)
            .map(|node| node.descendants().skip(1).map(|node| node.id()).collect())
            .unwrap_or_default()
    }

    fn selected_option_value(&self) -> String {
        let options = self.query_all("option");
        options
            .iter()
            .find(|option| option.has_attr("selected"))
            .or_else(|| options.first())
            .map(|option| option.attr("value").unwrap_or_else(|| option.text()))
            .unwrap_or_default()
    }
}

impl Element for MemoryElement {
    fn tag_name(&self) -> String {
        self.with_ref(|element| element.value().name().to_string())
            .unwrap_or_default()
    }

    fn attr(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.with_ref(|element| element.value().attr(&name).map(str::to_string))
            .flatten()
    }

    fn set_attr(&self, name: &str, value: &str) {
        let qualified = attribute_name(name);
        self.edit_attrs(|attrs| {
            let value = StrTendril::from_slice(value);
            match attrs.iter_mut().find(|attr| attr.name == qualified) {
                Some(attr) => attr.value = value,
                None => attrs.push(Attribute {
                    name: qualified,
                    value,
                }),
            }
        });
    }

    fn remove_attr(&self, name: &str) {
        let qualified = attribute_name(name);
        self.edit_attrs(|attrs| attrs.retain(|attr| attr.name != qualified));
    }

    fn add_class(&self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let current = self.attr("class").unwrap_or_default();
        let updated = if current.trim().is_empty() {
            class.to_string()
        } else {
            format!("{} {class}", current.trim())
        };
        self.set_attr("class", &updated);
    }

    fn remove_class(&self, class: &str) {
        let Some(current) = self.attr("class") else {
            return;
        };
        let updated: Vec<&str> = current
            .split_ascii_whitespace()
            .filter(|existing| *existing != class)
            .collect();
        self.set_attr("class", &updated.join(" "));
    }

    fn inner_html(&self) -> String {
        self.with_ref(|element| element.inner_html()).unwrap_or_default()
    }

    fn set_inner_html(&self, markup: &str) {
        let fragment = Html::parse_fragment(markup);
        let mut html = self.page.html.borrow_mut();
        detach_children(&mut html.tree, self.id);
        graft(&mut html.tree, self.id, *fragment.root_element());
    }

    fn text(&self) -> String {
        self.with_ref(|element| element.text().collect::<String>())
            .unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        let mut html = self.page.html.borrow_mut();
        detach_children(&mut html.tree, self.id);
        if let Some(mut node) = html.tree.get_mut(self.id) {
            node.append(Node::Text(Text {
                text: StrTendril::from_slice(text),
            }));
        }
    }

    fn value(&self) -> String {
        let dirty = self.page.values.borrow().get(&self.id).cloned();
        if let Some(value) = dirty {
            return value;
        }
        if self.is_tag("textarea") {
            return self.text();
        }
        if self.is_tag("select") {
            return self.selected_option_value();
        }
        self.attr("value").unwrap_or_default()
    }

    fn set_value(&self, value: &str) {
        self.page.values.borrow_mut().insert(self.id, value.to_string());
    }

    fn is_checked(&self) -> bool {
        let dirty = self.page.checked.borrow().get(&self.id).copied();
        dirty.unwrap_or_else(|| self.has_attr("checked"))
    }

    fn reset(&self) {
        let controls = self.descendant_ids();
        let mut values = self.page.values.borrow_mut();
        let mut checked = self.page.checked.borrow_mut();
        for id in controls {
            values.remove(&id);
            checked.remove(&id);
        }
    }

    fn matches(&self, selector: &str) -> bool {
        let Some(parsed) = parse_selector(selector) else {
            return false;
        };
        self.with_ref(|element| parsed.matches(&element))
            .unwrap_or(false)
    }

    fn closest(&self, selector: &str) -> Option<Self> {
        let parsed = parse_selector(selector)?;
        let found = {
            let html = self.page.html.borrow();
            let node = html.tree.get(self.id)?;
            matching_ids(std::iter::once(node).chain(node.ancestors()), &parsed)
                .into_iter()
                .next()
        };
        found.map(|id| self.page.element(id))
    }

    fn query_all(&self, selector: &str) -> Vec<Self> {
        let Some(parsed) = parse_selector(selector) else {
            return Vec::new();
        };
        let ids = {
            let html = self.page.html.borrow();
            match html.tree.get(self.id) {
                Some(node) => matching_ids(node.descendants().skip(1), &parsed),
                None => Vec::new(),
            }
        };
        self.page.elements(ids)
    }

    fn is_connected(&self) -> bool {
        let html = self.page.html.borrow();
        let root = html.tree.root().id();
        html.tree.get(self.id).is_some_and(|node| {
            node.id() == root || node.ancestors().any(|ancestor| ancestor.id() == root)
        })
    }

    fn remove(&self) {
        if let Some(mut node) = self.page.html.borrow_mut().tree.get_mut(self.id) {
            node.detach();
        }
    }
}

/// A parsed page plus a record of the window-level effects handlers caused.
pub struct MemoryDocument {
    page: Rc<Page>,
    cookie: RefCell<String>,
    location: RefCell<String>,
    navigations: RefCell<Vec<String>>,
    reloads: Cell<usize>,
    viewport_width: Cell<u32>,
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("location", &self.location.borrow())
            .field("navigations", &self.navigations.borrow())
            .field("reloads", &self.reloads.get())
            .finish_non_exhaustive()
    }
}

impl MemoryDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            page: Rc::new(Page {
                html: RefCell::new(Html::parse_document(html)),
                values: RefCell::new(HashMap::new()),
                checked: RefCell::new(HashMap::new()),
            }),
            cookie: RefCell::new(String::new()),
            location: RefCell::new("http://localhost/".to_string()),
            navigations: RefCell::new(Vec::new()),
            reloads: Cell::new(0),
            viewport_width: Cell::new(1280),
        }
    }

    pub fn with_location(self, location: impl Into<String>) -> Self {
        *self.location.borrow_mut() = location.into();
        self
    }

    pub fn set_cookie(&self, cookie: impl Into<String>) {
        *self.cookie.borrow_mut() = cookie.into();
    }

    pub fn set_viewport_width(&self, width: u32) {
        self.viewport_width.set(width);
    }

    /// URLs passed to [`Document::navigate`], oldest first.
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    pub fn reload_count(&self) -> usize {
        self.reloads.get()
    }

    pub fn body(&self) -> Option<MemoryElement> {
        self.query("body")
    }
}

impl Document for MemoryDocument {
    type Element = MemoryElement;

    fn query_all(&self, selector: &str) -> Vec<MemoryElement> {
        let Some(parsed) = parse_selector(selector) else {
            return Vec::new();
        };
        let ids = {
            let html = self.page.html.borrow();
            matching_ids(html.tree.root().descendants(), &parsed)
        };
        self.page.elements(ids)
    }

    fn append_to_body(&self, markup: &str) -> Option<MemoryElement> {
        let body = self.body()?;
        let fragment = Html::parse_fragment(markup);
        let source = fragment
            .root_element()
            .children()
            .find(|child| child.value().is_element())?;

        let mut html = self.page.html.borrow_mut();
        let id = html.tree.get_mut(body.id)?.append(source.value().clone()).id();
        graft(&mut html.tree, id, source);
        drop(html);
        Some(self.page.element(id))
    }

    fn cookie(&self) -> String {
        self.cookie.borrow().clone()
    }

    fn location(&self) -> String {
        self.location.borrow().clone()
    }

    fn navigate(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }

    fn viewport_width(&self) -> u32 {
        self.viewport_width.get()
    }
}
