use axum::{
    Json, Router,
    extract::{Form, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, post},
};
use calendar_ui::app::{DomEvent, EventKind, route};
use calendar_ui::dom::{Document, Element, MemoryDocument};
use calendar_ui::handlers::run;
use calendar_ui::state::AppState;
use calendar_ui::timer::ManualTimer;
use calendar_ui::transport::HttpTransport;
use once_cell::sync::Lazy;
use serde_json::json;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

static TRACING: Lazy<()> = Lazy::new(|| {
    let _ = calendar_ui::telemetry::init();
});

const CSRF_COOKIE_TOKEN: &str = "cookie-token";

#[derive(Clone, Default)]
struct Backend {
    created: Arc<Mutex<Vec<String>>>,
    rsvps: Arc<Mutex<Vec<(String, String)>>>,
}

fn csrf_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-CSRFToken")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn calendar_view(Query(params): Query<HashMap<String, String>>) -> Html<String> {
    let month = params.get("month").cloned().unwrap_or_else(|| "01".to_string());
    Html(format!(
        r#"<!DOCTYPE html><html><head><title>Calendar</title></head><body>
        <nav>Site</nav>
        <div class="calendar-container"><div class="calendar-day" data-date="2024-{month}-01"><a class="calendar-event" data-event-id="77">Sync</a></div></div>
        </body></html>"#
    ))
}

async fn quick_create(
    State(backend): State<Backend>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, value);
    }

    if csrf_header(&headers) != fields.get("csrfmiddlewaretoken").cloned() {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "CSRF verification failed" })));
    }
    let title = fields.get("title").cloned().unwrap_or_default();
    if title.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "error": "Title is required" })),
        );
    }

    let mut created = backend.created.lock().unwrap();
    created.push(title);
    (
        StatusCode::OK,
        Json(json!({ "success": true, "event_id": created.len(), "message": "Event created successfully!" })),
    )
}

async fn rsvp(
    State(backend): State<Backend>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    if csrf_header(&headers).as_deref() != Some(CSRF_COOKIE_TOKEN) {
        return (StatusCode::FORBIDDEN, Json(json!({ "error": "CSRF verification failed" })));
    }
    let status = form.get("status").cloned().unwrap_or_default();
    if !["ACCEPTED", "DECLINED", "TENTATIVE"].contains(&status.as_str()) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid status" })));
    }

    backend.rsvps.lock().unwrap().push((id, status.clone()));
    (
        StatusCode::OK,
        Json(json!({ "success": true, "status": status, "message": format!("RSVP updated to {status}") })),
    )
}

async fn events_feed(Query(params): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
    let day = params.get("start").cloned().unwrap_or_default();
    Json(json!([
        {
            "id": 1,
            "title": "Company holiday",
            "start": format!("{day}T00:00:00"),
            "end": format!("{day}T23:59:00"),
            "allDay": true,
            "color": "#e67e22",
            "url": "/calendar/event/1/",
            "description": ""
        },
        {
            "id": 2,
            "title": "Design review",
            "start": format!("{day}T06:00:00"),
            "end": format!("{day}T07:30:00"),
            "allDay": false,
            "color": null,
            "url": "/calendar/event/2/",
            "description": "Room 4"
        }
    ]))
}

async fn spawn_backend() -> (String, Backend) {
    Lazy::force(&TRACING);
    let backend = Backend::default();
    let app = Router::new()
        .route("/calendar/view/", get(calendar_view))
        .route("/calendar/quick-create/", post(quick_create))
        .route("/calendar/event/:id/rsvp/", post(rsvp))
        .route("/calendar/api/events/", get(events_feed))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind random port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub backend");
    });
    (format!("http://{addr}"), backend)
}

struct Page {
    doc: Rc<MemoryDocument>,
    timer: Rc<ManualTimer>,
    state: AppState<MemoryDocument>,
}

impl Page {
    fn open(base: &str, html: &str) -> Self {
        let location = format!("{base}/calendar/view/");
        let timer = Rc::new(ManualTimer::new());
        let transport = Rc::new(HttpTransport::new(&location).expect("valid page url"));
        let doc = Rc::new(MemoryDocument::parse(html).with_location(location));
        let state = AppState::new(doc.clone(), transport, timer.clone());
        Self { doc, timer, state }
    }

    fn el(&self, selector: &str) -> calendar_ui::dom::MemoryElement {
        self.doc
            .query(selector)
            .unwrap_or_else(|| panic!("no element matches `{selector}`"))
    }

    async fn fire(&self, kind: EventKind, selector: &str) {
        let dispatch = route(&self.state, &DomEvent::new(kind, self.el(selector)));
        for action in dispatch.actions {
            run(&self.state, action).await;
        }
    }
}

#[tokio::test]
async fn http_navigation_swaps_calendar_region() {
    let (base, _backend) = spawn_backend().await;
    let page = Page::open(
        &base,
        r#"<html><body>
            <a class="calendar-nav-btn" href="/calendar/view/?month=02">Next</a>
            <div class="calendar-container"><div class="calendar-day" data-date="2024-01-01"></div></div>
        </body></html>"#,
    );

    page.fire(EventKind::Click, ".calendar-nav-btn").await;

    assert!(page.doc.query(r#".calendar-day[data-date="2024-02-01"]"#).is_some());
    assert!(page.doc.query("nav").is_none());
    assert!(!page.el(".calendar-container").has_class("loading"));

    page.fire(EventKind::Click, ".calendar-event").await;
    assert_eq!(page.doc.navigations(), vec!["/calendar/event/77/".to_string()]);
}

#[tokio::test]
async fn http_navigation_with_query_only_href_stays_on_page_path() {
    let (base, _backend) = spawn_backend().await;
    let page = Page::open(
        &base,
        r#"<html><body>
            <a class="calendar-nav-btn" href="?view=month&amp;year=2024&amp;month=03">Next</a>
            <div class="calendar-container"><p id="kept">January</p></div>
        </body></html>"#,
    );

    page.fire(EventKind::Click, ".calendar-nav-btn").await;

    assert!(page.doc.query(r#".calendar-day[data-date="2024-03-01"]"#).is_some());
    assert!(page.doc.query("#kept").is_none());
    assert!(page.doc.query(".alert-danger").is_none());
}

#[tokio::test]
async fn http_navigation_to_missing_route_notifies() {
    let (base, _backend) = spawn_backend().await;
    let page = Page::open(
        &base,
        r#"<html><body>
            <a class="calendar-nav-btn" href="/calendar/nowhere/">Next</a>
            <div class="calendar-container"><p id="kept">January</p></div>
        </body></html>"#,
    );

    page.fire(EventKind::Click, ".calendar-nav-btn").await;

    assert!(page.doc.query("#kept").is_some());
    assert!(page.el(".alert-danger").text().contains("Error loading calendar"));
}

const QUICK_FORM: &str = r#"<html><body>
    <form id="quick-event-form" action="/calendar/quick-create/">
        <input type="hidden" name="csrfmiddlewaretoken" value="form-token">
        <input name="title" value="">
        <input type="checkbox" name="all_day" value="true">
        <button type="submit">Create</button>
    </form>
</body></html>"#;

#[tokio::test]
async fn http_quick_create_posts_form_and_reloads() {
    let (base, backend) = spawn_backend().await;
    let page = Page::open(&base, QUICK_FORM);
    page.el(r#"input[name="title"]"#).set_value("Standup");

    page.fire(EventKind::Submit, "#quick-event-form").await;

    assert_eq!(*backend.created.lock().unwrap(), vec!["Standup".to_string()]);
    assert!(page.el(".alert-success").text().contains("Event created successfully!"));
    assert_eq!(page.el(r#"input[name="title"]"#).value(), "");
    let button = page.el(r#"button[type="submit"]"#);
    assert_eq!(button.inner_html(), "Create");
    assert!(!button.is_disabled());

    page.timer.advance(Duration::from_secs(1));
    assert_eq!(page.doc.reload_count(), 1);
}

#[tokio::test]
async fn http_quick_create_rejection_shows_server_error() {
    let (base, backend) = spawn_backend().await;
    let page = Page::open(&base, QUICK_FORM);

    page.fire(EventKind::Submit, "#quick-event-form").await;

    assert!(backend.created.lock().unwrap().is_empty());
    assert!(page.el(".alert-danger").text().contains("Title is required"));
    page.timer.advance(Duration::from_secs(2));
    assert_eq!(page.doc.reload_count(), 0);
}

const INVITATIONS: &str = r#"<html><body>
    <div data-event-id="12"><span class="badge rsvp-status badge-status-pending">Pending</span></div>
    <div class="row" data-invitation-list>
        <div class="col-md-6" id="invite-12">
            <button class="rsvp-btn" data-event-id="12" data-status="TENTATIVE">Maybe</button>
        </div>
    </div>
</body></html>"#;

#[tokio::test]
async fn http_rsvp_sends_cookie_token() {
    let (base, backend) = spawn_backend().await;
    let page = Page::open(&base, INVITATIONS);
    page.doc.set_cookie(format!("csrftoken={CSRF_COOKIE_TOKEN}"));

    page.fire(EventKind::Click, ".rsvp-btn").await;

    assert_eq!(
        *backend.rsvps.lock().unwrap(),
        vec![("12".to_string(), "TENTATIVE".to_string())]
    );
    let badge = page.el(".rsvp-status");
    assert_eq!(badge.attr("class").as_deref(), Some("badge rsvp-status badge-status-tentative"));
    assert_eq!(badge.text(), "Tentative");
    assert!(page.doc.query("#invite-12").is_none());
    assert!(page.el(".alert-success").text().contains("RSVP updated to TENTATIVE"));
}

#[tokio::test]
async fn http_rsvp_without_cookie_is_refused() {
    let (base, backend) = spawn_backend().await;
    let page = Page::open(&base, INVITATIONS);

    page.fire(EventKind::Click, ".rsvp-btn").await;

    assert!(backend.rsvps.lock().unwrap().is_empty());
    assert!(page.el(".alert-danger").text().contains("CSRF verification failed"));
    assert!(page.doc.query("#invite-12").is_some());
    let control = page.el(".rsvp-btn");
    assert_eq!(control.inner_html(), "Maybe");
    assert!(!control.is_disabled());
}

#[tokio::test]
async fn http_day_view_renders_feed() {
    let (base, _backend) = spawn_backend().await;
    let page = Page::open(
        &base,
        r#"<html><body><div class="day-view" data-day-view data-date="2024-05-06"></div></body></html>"#,
    );

    let today = chrono::NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    calendar_ui::handlers::initialize(&page.state, today).await;

    let all_day = page.el(".day-view-all-day .day-event");
    assert_eq!(all_day.attr("data-event-id").as_deref(), Some("1"));
    let timed = page.el(".day-view-grid .day-event");
    assert_eq!(timed.attr("data-event-id").as_deref(), Some("2"));
    assert!(timed.attr("style").unwrap_or_default().contains("top: 25%;"));
    assert!(timed.text().contains("06:00 - 07:30"));
}
