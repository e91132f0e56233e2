//! Event delegation: one listener per event kind on the document, routed
//! here by the element the event started on.

use tracing::debug;

use crate::dom::{Document, Element};
use crate::models::RsvpStatus;
use crate::state::AppState;
use crate::ui::NOTIFICATION_ATTR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    DoubleClick,
    Submit,
    Change,
}

impl EventKind {
    pub const ALL: [Self; 4] = [Self::Click, Self::DoubleClick, Self::Submit, Self::Change];

    pub fn dom_type(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::DoubleClick => "dblclick",
            Self::Submit => "submit",
            Self::Change => "change",
        }
    }

    pub fn from_dom_type(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.dom_type() == value)
    }
}

#[derive(Debug, Clone)]
pub struct DomEvent<E> {
    pub kind: EventKind,
    pub target: E,
}

impl<E> DomEvent<E> {
    pub fn new(kind: EventKind, target: E) -> Self {
        Self { kind, target }
    }
}

#[derive(Debug, Clone)]
pub enum Action<E> {
    LoadCalendarView { url: String },
    OpenEvent { event_id: String },
    CreateOnDay { date: String },
    QuickCreate { form: E },
    Rsvp { control: E, event_id: String, status: RsvpStatus },
    AdjustEndTime { start: E },
    ToggleSidebar,
    CloseSidebar,
    DismissNotification { banner: E },
}

#[derive(Debug, Clone)]
pub struct Dispatch<E> {
    pub prevent_default: bool,
    pub actions: Vec<Action<E>>,
}

impl<E> Default for Dispatch<E> {
    fn default() -> Self {
        Self {
            prevent_default: false,
            actions: Vec::new(),
        }
    }
}

fn non_empty_attr<E: Element>(element: &E, name: &str) -> Option<String> {
    element.attr(name).filter(|value| !value.is_empty())
}

/// Resolves every capability the event triggers. Capabilities are
/// independent, as separately bound listeners would be.
pub fn route<D: Document>(state: &AppState<D>, event: &DomEvent<D::Element>) -> Dispatch<D::Element> {
    let selectors = &state.config.selectors;
    let target = &event.target;
    let mut dispatch = Dispatch::default();

    match event.kind {
        EventKind::Click => {
            if let Some(close) = target.closest(&selectors.notification_close) {
                if let Some(banner) = close.closest(&format!("[{NOTIFICATION_ATTR}]")) {
                    dispatch.actions.push(Action::DismissNotification { banner });
                }
            }

            if let Some(control) = target.closest(&selectors.nav_control) {
                dispatch.prevent_default = true;
                if let Some(url) = non_empty_attr(&control, "href") {
                    dispatch.actions.push(Action::LoadCalendarView { url });
                }
            }

            if let Some(entry) = target.closest(&selectors.calendar_entry) {
                dispatch.prevent_default = true;
                if let Some(event_id) = non_empty_attr(&entry, "data-event-id") {
                    dispatch.actions.push(Action::OpenEvent { event_id });
                }
            }

            if let Some(control) = target.closest(&selectors.rsvp_control) {
                let event_id = non_empty_attr(&control, "data-event-id");
                let status = control.attr("data-status").and_then(RsvpStatus::new);
                if let (Some(event_id), Some(status)) = (event_id, status) {
                    dispatch.actions.push(Action::Rsvp { control, event_id, status });
                }
            }

            let toggled = target.closest(&selectors.sidebar_toggle).is_some();
            if toggled {
                dispatch.actions.push(Action::ToggleSidebar);
            } else if target.closest(&selectors.content).is_some()
                && state.doc.viewport_width() <= state.config.timing.mobile_max_width
            {
                dispatch.actions.push(Action::CloseSidebar);
            }
        }
        EventKind::DoubleClick => {
            if let Some(day) = target.closest(&selectors.day_cell) {
                if let Some(date) = non_empty_attr(&day, "data-date") {
                    dispatch.actions.push(Action::CreateOnDay { date });
                }
            }
        }
        EventKind::Submit => {
            if let Some(form) = target.closest(&selectors.quick_create_form) {
                dispatch.prevent_default = true;
                dispatch.actions.push(Action::QuickCreate { form });
            }
        }
        EventKind::Change => {
            if target.matches(&selectors.start_datetime) {
                dispatch.actions.push(Action::AdjustEndTime { start: target.clone() });
            }
        }
    }

    debug!(
        kind = event.kind.dom_type(),
        actions = dispatch.actions.len(),
        prevent_default = dispatch.prevent_default,
        "event routed"
    );
    dispatch
}
