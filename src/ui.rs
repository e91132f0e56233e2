use crate::layout::EventPosition;

pub const SPINNER: &str = r#"<span class="spinner"></span>"#;
pub const CREATING_LABEL: &str = r#"<span class="spinner"></span> Creating..."#;

/// Marks banners created by the notification helper.
pub const NOTIFICATION_ATTR: &str = "data-calendar-notification";

const NOTIFICATION_HTML: &str = r#"<div class="alert alert-{{KIND}} alert-dismissible fade show" data-calendar-notification="" role="alert" style="position: fixed; top: 20px; right: 20px; z-index: 9999; min-width: 300px;">
    {{MESSAGE}}
    <button type="button" class="btn-close" data-bs-dismiss="alert"></button>
</div>"#;

const DAY_EVENT_HTML: &str = r#"<div class="day-event" data-event-id="{{ID}}" style="top: {{TOP}}; height: {{HEIGHT}}; background-color: {{COLOR}};" title="{{TIME}}"><span class="event-time">{{TIME}}</span> <span class="event-title">{{TITLE}}</span></div>"#;

const ALL_DAY_EVENT_HTML: &str = r#"<div class="day-event all-day" data-event-id="{{ID}}" style="background-color: {{COLOR}};"><span class="event-title">{{TITLE}}</span></div>"#;

pub fn render_notification(message: &str, alert_kind: &str) -> String {
    NOTIFICATION_HTML
        .replace("{{KIND}}", alert_kind)
        .replace("{{MESSAGE}}", &escape_html(message))
}

pub struct DayEventMarkup<'a> {
    pub id: u64,
    pub title: &'a str,
    pub time_range: &'a str,
    pub color: &'a str,
    pub position: EventPosition,
}

pub fn render_day_event(event: &DayEventMarkup<'_>) -> String {
    DAY_EVENT_HTML
        .replace("{{ID}}", &event.id.to_string())
        .replace("{{TOP}}", &event.position.css_top())
        .replace("{{HEIGHT}}", &event.position.css_height())
        .replace("{{COLOR}}", &escape_html(event.color))
        .replace("{{TIME}}", &escape_html(event.time_range))
        .replace("{{TITLE}}", &escape_html(event.title))
}

pub fn render_all_day_event(id: u64, title: &str, color: &str) -> String {
    ALL_DAY_EVENT_HTML
        .replace("{{ID}}", &id.to_string())
        .replace("{{COLOR}}", &escape_html(color))
        .replace("{{TITLE}}", &escape_html(title))
}

pub fn render_all_day_strip(items: &[String]) -> String {
    format!(r#"<div class="day-view-all-day">{}</div>"#, items.concat())
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
