use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::dom::{Document, Element};
use crate::timer::Timer;
use crate::ui::render_notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

impl Severity {
    /// Alert style suffix used by the page's stylesheet.
    pub fn alert_kind(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "danger",
        }
    }
}

impl FromStr for Severity {
    type Err = std::convert::Infallible;

    /// Unrecognized severities are informational.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" | "danger" => Self::Error,
            _ => Self::Info,
        })
    }
}

/// Appends a banner to the body that removes itself after `ttl`. Returns the
/// banner, or `None` when the page has no body.
pub fn show_notification<D: Document>(
    doc: &D,
    timer: &Rc<dyn Timer>,
    ttl: Duration,
    message: &str,
    severity: Severity,
) -> Option<D::Element> {
    let Some(banner) = doc.append_to_body(&render_notification(message, severity.alert_kind())) else {
        warn!(text = message, "no body to attach notification to");
        return None;
    };
    debug!(text = message, kind = severity.alert_kind(), "notification shown");

    let expiring = banner.clone();
    timer.schedule(
        ttl,
        Box::new(move || {
            if expiring.is_connected() {
                expiring.remove();
            }
        }),
    );
    Some(banner)
}

pub fn dismiss<E: Element>(banner: &E) {
    if banner.is_connected() {
        banner.remove();
    }
}
