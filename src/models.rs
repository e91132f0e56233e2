use serde::{Deserialize, Serialize};

/// Body of the quick-create endpoint, for both 200 and 4xx replies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickCreateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub event_id: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RsvpResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// One entry of the `/calendar/api/events/` feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFeedItem {
    pub id: u64,
    pub title: String,
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Attendance answer as carried by an RSVP control's `data-status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpStatus(String);

impl RsvpStatus {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    /// Value sent to the server, exactly as found in the markup.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn css_suffix(&self) -> String {
        self.0.to_lowercase()
    }

    /// `ACCEPTED` becomes `Accepted`.
    pub fn label(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => {
                let mut label: String = first.to_uppercase().collect();
                label.push_str(&chars.as_str().to_lowercase());
                label
            }
            None => String::new(),
        }
    }

    pub fn badge_class(&self) -> String {
        format!("badge rsvp-status badge-status-{}", self.css_suffix())
    }
}
