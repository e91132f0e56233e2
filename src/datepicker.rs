use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::config::Selectors;
use crate::dom::{Document, Element};
use crate::layout::parse_timestamp;

const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Sets `min` to `today` on every date input that does not opt out with the
/// allow-past attribute. Returns how many inputs were touched.
pub fn apply_min_dates<D: Document>(doc: &D, selectors: &Selectors, today: NaiveDate) -> usize {
    let min = today.format("%Y-%m-%d").to_string();
    let mut touched = 0;
    for input in doc.query_all(&selectors.date_input) {
        if input.has_attr(&selectors.allow_past_attr) {
            continue;
        }
        input.set_attr("min", &min);
        touched += 1;
    }
    debug!(touched, %min, "date input minimums applied");
    touched
}

/// New end value after the start changed, or `None` when the end should be
/// left alone: it is already strictly after the start, or the start does not
/// parse.
pub fn adjusted_end(start: &str, end: &str) -> Option<String> {
    let start = parse_timestamp(start)?;
    let keep = parse_timestamp(end).is_some_and(|end| end > start);
    if keep {
        return None;
    }
    Some((start + Duration::hours(1)).format(DATETIME_LOCAL_FORMAT).to_string())
}

/// Applies [`adjusted_end`] to the page's end input, if there is one.
pub fn sync_end_time<D: Document>(doc: &D, selectors: &Selectors, start: &D::Element) {
    let Some(end) = doc.query(&selectors.end_datetime) else {
        return;
    };
    if let Some(value) = adjusted_end(&start.value(), &end.value()) {
        debug!(%value, "end time moved after start");
        end.set_value(&value);
    }
}
