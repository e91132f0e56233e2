//! Single-day agenda grids filled from the events feed.

use tracing::{error, info, warn};
use url::form_urlencoded;

use crate::config::DayViewConfig;
use crate::dom::{Document, Element};
use crate::errors::ActionError;
use crate::layout::{duration_minutes, event_position, format_event_time, parse_timestamp, truncate_text};
use crate::models::EventFeedItem;
use crate::notify::Severity;
use crate::state::AppState;
use crate::ui::{DayEventMarkup, render_all_day_event, render_all_day_strip, render_day_event};

const FEED_ERROR: &str = "Error loading events";
const DEFAULT_DURATION_MINUTES: f64 = 60.0;

pub fn feed_url(base: &str, start: &str, end: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("start", start)
        .append_pair("end", end)
        .finish();
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}")
}

pub async fn fetch_events<D: Document>(
    state: &AppState<D>,
    start: &str,
    end: &str,
) -> Result<Vec<EventFeedItem>, ActionError> {
    let url = feed_url(&state.config.routes.events_feed, start, end);
    let body = state.transport.get(&url).await?.into_success_body()?;
    Ok(serde_json::from_str(&body)?)
}

/// Markup for one day: the all-day strip (when there are all-day items)
/// followed by the positioned grid. Items whose start does not parse are
/// skipped; an unreadable end gets an hour.
pub fn render_day(items: &[EventFeedItem], config: &DayViewConfig) -> String {
    let mut all_day = Vec::new();
    let mut timed = String::new();

    for item in items {
        let color = item.color.as_deref().unwrap_or(&config.default_color);
        let title = truncate_text(&item.title, config.title_max_length);

        if item.all_day {
            all_day.push(render_all_day_event(item.id, &title, color));
            continue;
        }

        let Some(start) = parse_timestamp(&item.start) else {
            warn!(id = item.id, start = %item.start, "skipping feed item with unreadable start");
            continue;
        };
        let (minutes, end) = match parse_timestamp(&item.end) {
            Some(end) => (duration_minutes(&start, &end), end),
            None => (
                DEFAULT_DURATION_MINUTES,
                start + chrono::Duration::minutes(DEFAULT_DURATION_MINUTES as i64),
            ),
        };

        timed.push_str(&render_day_event(&DayEventMarkup {
            id: item.id,
            title: &title,
            time_range: &format_event_time(&start, &end),
            color,
            position: event_position(&start, minutes),
        }));
    }

    let mut html = String::new();
    if !all_day.is_empty() {
        html.push_str(&render_all_day_strip(&all_day));
    }
    html.push_str(r#"<div class="day-view-grid">"#);
    html.push_str(&timed);
    html.push_str("</div>");
    html
}

/// Fills every day-view container on the page. Returns how many were filled.
pub async fn load_day_views<D: Document>(state: &AppState<D>) -> usize {
    let mut filled = 0;
    for container in state.doc.query_all(&state.config.selectors.day_view) {
        let Some(date) = container.attr("data-date").filter(|date| !date.is_empty()) else {
            continue;
        };

        match fetch_events(state, &date, &date).await {
            Ok(items) => {
                if container.is_connected() {
                    container.set_inner_html(&render_day(&items, &state.config.day_view));
                    filled += 1;
                }
                info!(%date, events = items.len(), "day view loaded");
            }
            Err(err) => {
                error!(%date, "error loading events: {err}");
                state.notify(FEED_ERROR, Severity::Error);
            }
        }
    }
    filled
}
