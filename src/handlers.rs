use std::rc::Rc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::app::Action;
use crate::datepicker::{apply_min_dates, sync_end_time};
use crate::day_view::load_day_views;
use crate::dom::{Document, Element, cookie_value, form_fields, quote_attribute_value};
use crate::errors::ActionError;
use crate::fragment::extract_region;
use crate::models::{QuickCreateResponse, RsvpResponse, RsvpStatus};
use crate::notify::{Severity, dismiss};
use crate::state::AppState;
use crate::transport::{CsrfHeader, RequestBody};
use crate::ui::{CREATING_LABEL, SPINNER};

const CALENDAR_LOAD_ERROR: &str = "Error loading calendar";
const QUICK_CREATE_SUCCESS: &str = "Event created successfully!";
const QUICK_CREATE_ERROR: &str = "Error creating event";
const RSVP_SUCCESS: &str = "RSVP updated";
const RSVP_ERROR: &str = "Error updating RSVP";

/// Swaps a control into a busy state and puts it back when dropped, so the
/// original label and enabled state return on every exit path.
struct BusyControl<E: Element> {
    control: E,
    original: String,
}

impl<E: Element> BusyControl<E> {
    fn engage(control: &E, busy_html: &str) -> Self {
        let original = control.inner_html();
        control.set_inner_html(busy_html);
        control.set_disabled(true);
        Self {
            control: control.clone(),
            original,
        }
    }
}

impl<E: Element> Drop for BusyControl<E> {
    fn drop(&mut self) {
        self.control.set_inner_html(&self.original);
        self.control.set_disabled(false);
    }
}

/// Page-load work that is not event driven: date minimums, tooltips and the
/// day view.
pub async fn initialize<D: Document>(state: &AppState<D>, today: NaiveDate) {
    let selectors = &state.config.selectors;
    apply_min_dates(state.doc.as_ref(), selectors, today);
    activate_tooltips(state);
    load_day_views(state).await;
}

pub fn activate_tooltips<D: Document>(state: &AppState<D>) -> usize {
    let Some(tooltips) = &state.tooltips else {
        return 0;
    };
    let elements = state.doc.query_all(&state.config.selectors.tooltip);
    for element in &elements {
        tooltips.attach(element);
    }
    elements.len()
}

pub async fn run<D: Document>(state: &AppState<D>, action: Action<D::Element>) {
    match action {
        Action::LoadCalendarView { url } => load_calendar_view(state, &url).await,
        Action::OpenEvent { event_id } => {
            state.doc.navigate(&state.config.routes.event_detail_url(&event_id));
        }
        Action::CreateOnDay { date } => {
            state.doc.navigate(&state.config.routes.event_create_url(&date));
        }
        Action::QuickCreate { form } => submit_quick_create(state, &form).await,
        Action::Rsvp {
            control,
            event_id,
            status,
        } => submit_rsvp(state, &control, &event_id, &status).await,
        Action::AdjustEndTime { start } => {
            sync_end_time(state.doc.as_ref(), &state.config.selectors, &start);
        }
        Action::ToggleSidebar => {
            if let Some(sidebar) = state.doc.query(&state.config.selectors.sidebar) {
                sidebar.toggle_class(&state.config.selectors.sidebar_active_class);
            }
        }
        Action::CloseSidebar => {
            let active = &state.config.selectors.sidebar_active_class;
            if let Some(sidebar) = state.doc.query(&state.config.selectors.sidebar) {
                if sidebar.has_class(active) {
                    sidebar.remove_class(active);
                }
            }
        }
        Action::DismissNotification { banner } => dismiss(&banner),
    }
}

pub async fn load_calendar_view<D: Document>(state: &AppState<D>, url: &str) {
    let selectors = &state.config.selectors;
    let Some(container) = state.doc.query(&selectors.calendar_container) else {
        return;
    };

    container.add_class(&selectors.loading_class);
    let result = fetch_region(state, url).await;
    match result {
        Ok(Some(markup)) => {
            if container.is_connected() {
                container.set_inner_html(&markup);
                info!(url, "calendar view loaded");
            }
        }
        Ok(None) => warn!(url, "response has no calendar region"),
        Err(err) => {
            error!(url, "error loading calendar view: {err}");
            state.notify(CALENDAR_LOAD_ERROR, Severity::Error);
        }
    }
    container.remove_class(&selectors.loading_class);
}

async fn fetch_region<D: Document>(state: &AppState<D>, url: &str) -> Result<Option<String>, ActionError> {
    let page = state.transport.get(url).await?.into_success_body()?;
    Ok(extract_region(&page, &state.config.selectors.calendar_container))
}

pub async fn submit_quick_create<D: Document>(state: &AppState<D>, form: &D::Element) {
    let busy = form
        .query(&state.config.selectors.submit_control)
        .map(|control| BusyControl::engage(&control, CREATING_LABEL));

    match post_quick_create(state, form).await {
        Ok(reply) if reply.success => {
            info!(event_id = ?reply.event_id, "event created");
            state.notify(QUICK_CREATE_SUCCESS, Severity::Success);
            form.reset();
            let doc = Rc::clone(&state.doc);
            state
                .timer
                .schedule(state.config.timing.reload_delay(), Box::new(move || doc.reload()));
        }
        Ok(reply) => {
            let message = reply.error.unwrap_or_else(|| QUICK_CREATE_ERROR.to_string());
            warn!(%message, "event creation rejected");
            state.notify(&message, Severity::Error);
        }
        Err(err) => {
            error!("error creating event: {err}");
            state.notify(QUICK_CREATE_ERROR, Severity::Error);
        }
    }

    drop(busy);
}

async fn post_quick_create<D: Document>(
    state: &AppState<D>,
    form: &D::Element,
) -> Result<QuickCreateResponse, ActionError> {
    let fields = form_fields(form);
    let csrf = &state.config.csrf;
    let token = fields
        .iter()
        .find(|(name, _)| *name == csrf.form_field)
        .map(|(_, value)| CsrfHeader {
            name: csrf.header.clone(),
            token: value.clone(),
        });
    let action = form
        .attr("action")
        .filter(|action| !action.is_empty())
        .unwrap_or_else(|| state.doc.location());

    let reply = state
        .transport
        .post(&action, RequestBody::Multipart(fields), token)
        .await?;
    reply.json()
}

pub async fn submit_rsvp<D: Document>(
    state: &AppState<D>,
    control: &D::Element,
    event_id: &str,
    status: &RsvpStatus,
) {
    let busy = BusyControl::engage(control, SPINNER);

    match post_rsvp(state, event_id, status).await {
        Ok(reply) if reply.success => {
            let message = reply.message.unwrap_or_else(|| RSVP_SUCCESS.to_string());
            info!(event_id, status = status.as_str(), "rsvp updated");
            state.notify(&message, Severity::Success);
            update_rsvp_badges(state, event_id, status);
            remove_invitation_card(state, control);
        }
        Ok(reply) => {
            let message = reply.error.unwrap_or_else(|| RSVP_ERROR.to_string());
            warn!(event_id, %message, "rsvp rejected");
            state.notify(&message, Severity::Error);
        }
        Err(err) => {
            error!(event_id, "error updating rsvp: {err}");
            state.notify(RSVP_ERROR, Severity::Error);
        }
    }

    drop(busy);
}

async fn post_rsvp<D: Document>(
    state: &AppState<D>,
    event_id: &str,
    status: &RsvpStatus,
) -> Result<RsvpResponse, ActionError> {
    let csrf = &state.config.csrf;
    let token = cookie_value(&state.doc.cookie(), &csrf.cookie).map(|token| CsrfHeader {
        name: csrf.header.clone(),
        token,
    });
    let body = RequestBody::UrlEncoded(vec![("status".to_string(), status.as_str().to_string())]);

    let reply = state
        .transport
        .post(&state.config.routes.rsvp_url(event_id), body, token)
        .await?;
    reply.json()
}

/// Rewrites every status badge scoped to `event_id`.
pub fn update_rsvp_badges<D: Document>(state: &AppState<D>, event_id: &str, status: &RsvpStatus) -> usize {
    let selector = format!(
        "[data-event-id={}] {}",
        quote_attribute_value(event_id),
        state.config.selectors.rsvp_badge
    );
    let badges = state.doc.query_all(&selector);
    for badge in &badges {
        badge.set_class_name(&status.badge_class());
        badge.set_text(&status.label());
    }
    badges.len()
}

fn remove_invitation_card<D: Document>(state: &AppState<D>, control: &D::Element) {
    let selectors = &state.config.selectors;
    let Some(card) = control.closest(&selectors.invitation_card) else {
        return;
    };
    if card.closest(&selectors.invitation_list).is_some() {
        card.remove();
    }
}
