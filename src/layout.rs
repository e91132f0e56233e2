use chrono::{DateTime, Local, NaiveDateTime, Timelike};

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;
const MIN_HEIGHT_PERCENT: f64 = 2.0;
const ELLIPSIS: &str = "...";

/// Vertical placement of an event inside a day grid, in percent of the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventPosition {
    pub top: f64,
    pub height: f64,
}

impl EventPosition {
    pub fn css_top(&self) -> String {
        format!("{}%", self.top)
    }

    pub fn css_height(&self) -> String {
        format!("{}%", self.height)
    }
}

/// Renders `"HH:MM - HH:MM"` in 24-hour wall clock time.
pub fn format_event_time(start: &NaiveDateTime, end: &NaiveDateTime) -> String {
    format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
}

pub fn event_position(start: &NaiveDateTime, duration_minutes: f64) -> EventPosition {
    let since_midnight = f64::from(start.hour() * 60 + start.minute());
    let top = (since_midnight / MINUTES_PER_DAY) * 100.0;
    let height = (duration_minutes / MINUTES_PER_DAY) * 100.0;

    EventPosition {
        top,
        height: height.max(MIN_HEIGHT_PERCENT),
    }
}

pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let keep = max_length.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Parses a feed or form timestamp into local wall clock time.
///
/// Offset-carrying RFC 3339 values are converted to the local zone; naive
/// values (`YYYY-MM-DDTHH:MM`, optionally with seconds) are taken as local.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Some(aware.with_timezone(&Local).naive_local());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Minutes between two timestamps, negative when `end` precedes `start`.
pub fn duration_minutes(start: &NaiveDateTime, end: &NaiveDateTime) -> f64 {
    (*end - *start).num_seconds() as f64 / 60.0
}
