//! Binder configuration.
//!
//! Defaults reproduce the markup contract of the calendar templates. A page
//! may override any field with a JSON block:
//!
//! ```html
//! <script type="application/json" id="calendar-config">{"routes": {"rsvp": "/cal/{id}/rsvp/"}}</script>
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::dom::{Document, Element};

pub const CONFIG_ELEMENT_SELECTOR: &str = "#calendar-config";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    pub selectors: Selectors,
    pub routes: Routes,
    pub csrf: CsrfConfig,
    pub timing: Timing,
    pub day_view: DayViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub nav_control: String,
    pub calendar_container: String,
    pub loading_class: String,
    pub calendar_entry: String,
    pub day_cell: String,
    pub quick_create_form: String,
    pub submit_control: String,
    pub rsvp_control: String,
    pub rsvp_badge: String,
    pub invitation_card: String,
    pub invitation_list: String,
    pub date_input: String,
    pub allow_past_attr: String,
    pub start_datetime: String,
    pub end_datetime: String,
    pub tooltip: String,
    pub sidebar_toggle: String,
    pub sidebar: String,
    pub sidebar_active_class: String,
    pub content: String,
    pub notification_close: String,
    pub day_view: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            nav_control: ".calendar-nav-btn".to_string(),
            calendar_container: ".calendar-container".to_string(),
            loading_class: "loading".to_string(),
            calendar_entry: ".calendar-event, .week-event, .day-event".to_string(),
            day_cell: ".calendar-day".to_string(),
            quick_create_form: "#quick-event-form".to_string(),
            submit_control: r#"button[type="submit"]"#.to_string(),
            rsvp_control: ".rsvp-btn".to_string(),
            rsvp_badge: ".rsvp-status".to_string(),
            invitation_card: ".col-md-6".to_string(),
            invitation_list: "[data-invitation-list]".to_string(),
            date_input: r#"input[type="date"]"#.to_string(),
            allow_past_attr: "data-allow-past".to_string(),
            start_datetime: r#"input[name="start_datetime"]"#.to_string(),
            end_datetime: r#"input[name="end_datetime"]"#.to_string(),
            tooltip: r#"[data-bs-toggle="tooltip"]"#.to_string(),
            sidebar_toggle: "#sidebarCollapse".to_string(),
            sidebar: "#sidebar".to_string(),
            sidebar_active_class: "active".to_string(),
            content: "#content".to_string(),
            notification_close: ".btn-close".to_string(),
            day_view: "[data-day-view]".to_string(),
        }
    }
}

/// URL templates; `{id}` and `{date}` are substituted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Routes {
    pub event_detail: String,
    pub event_create: String,
    pub rsvp: String,
    pub events_feed: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            event_detail: "/calendar/event/{id}/".to_string(),
            event_create: "/calendar/event/create/?start_date={date}".to_string(),
            rsvp: "/calendar/event/{id}/rsvp/".to_string(),
            events_feed: "/calendar/api/events/".to_string(),
        }
    }
}

impl Routes {
    pub fn event_detail_url(&self, id: &str) -> String {
        self.event_detail.replace("{id}", id)
    }

    pub fn event_create_url(&self, date: &str) -> String {
        self.event_create.replace("{date}", date)
    }

    pub fn rsvp_url(&self, id: &str) -> String {
        self.rsvp.replace("{id}", id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    pub header: String,
    pub form_field: String,
    pub cookie: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            header: "X-CSRFToken".to_string(),
            form_field: "csrfmiddlewaretoken".to_string(),
            cookie: "csrftoken".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub notification_ms: u64,
    pub reload_delay_ms: u64,
    /// Viewports at or below this width close the sidebar on content clicks.
    pub mobile_max_width: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            notification_ms: 5000,
            reload_delay_ms: 1000,
            mobile_max_width: 768,
        }
    }
}

impl Timing {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DayViewConfig {
    pub title_max_length: usize,
    pub default_color: String,
}

impl Default for DayViewConfig {
    fn default() -> Self {
        Self {
            title_max_length: 30,
            default_color: "#3498db".to_string(),
        }
    }
}

impl BinderConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the page's config block; a missing block yields the defaults and
    /// an unreadable one is logged and ignored.
    pub fn from_page<D: Document>(doc: &D) -> Self {
        let Some(element) = doc.query(CONFIG_ELEMENT_SELECTOR) else {
            return Self::default();
        };
        match Self::from_json(&element.text()) {
            Ok(config) => config,
            Err(err) => {
                error!("failed to parse calendar config: {err}");
                Self::default()
            }
        }
    }
}
