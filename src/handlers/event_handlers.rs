use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::csrf;
use crate::auth::session::{get_organizer_id, require_permission};
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::{event, no_show, role, signup};
use crate::roster::{RosterRegistry, hub};
use crate::templates_structs::{
    CloseConfirmTemplate, CloseReportTemplate, EventFormTemplate, EventListTemplate, PageContext,
};

// ---------------------------------------------------------------------------
// Form structs
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct EventForm {
    pub csrf_token: String,
    pub title: String,
    pub event_date: String,
    pub location: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct RoleForm {
    pub csrf_token: String,
    pub role_label: String,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub capacity: Option<String>, // comes as string from form, parse to i64
    pub poc_json: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct CloseForm {
    pub csrf_token: String,
    /// Checkbox — present when the operator opted into the contact purge.
    pub purge_contacts: Option<String>,
}

// ---------------------------------------------------------------------------
// GET — event list
// ---------------------------------------------------------------------------

/// GET /events — all events with roster aggregates.
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "roster.view")?;
    let conn = pool.get()?;
    let ctx = PageContext::build(&session)?;

    let events = event::find_all(&conn)?;

    let tmpl = EventListTemplate { ctx, events };
    render(tmpl)
}

// ---------------------------------------------------------------------------
// GET/POST — create event (plain form)
// ---------------------------------------------------------------------------

/// GET /events/new — event create form.
pub async fn new_form(session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;
    let ctx = PageContext::build(&session)?;
    let tmpl = EventFormTemplate { ctx, error: None };
    render(tmpl)
}

/// POST /events — create an event.
pub async fn create(
    pool: web::Data<DbPool>,
    session: Session,
    form: web::Form<EventForm>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let error = validate::validate_required(&form.title, "Title", 200)
        .or_else(|| validate::validate_required(&form.event_date, "Date", 30));
    if let Some(error) = error {
        let ctx = PageContext::build(&session)?;
        let tmpl = EventFormTemplate {
            ctx,
            error: Some(error),
        };
        return render(tmpl);
    }

    let conn = pool.get()?;
    let location = form.location.as_deref().unwrap_or("").trim();
    let event_id = event::create(&conn, form.title.trim(), form.event_date.trim(), location)?;

    let current_organizer_id = get_organizer_id(&session).unwrap_or(0);
    let details = serde_json::json!({
        "event_id": event_id,
        "summary": format!("Event '{}' created for {}", form.title.trim(), form.event_date.trim()),
    });
    let _ = crate::audit::log(
        &conn,
        current_organizer_id,
        "event.created",
        "event",
        event_id,
        details,
    );

    let _ = session.insert("flash", "Event created");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("/events/{event_id}/roster")))
        .finish())
}

// ---------------------------------------------------------------------------
// POST — add a volunteer role to an event
// ---------------------------------------------------------------------------

/// POST /events/{id}/roles — add a role to an open event.
pub async fn add_role(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<RoleForm>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let event_id = path.into_inner();
    let conn = pool.get()?;

    event::find_by_id(&conn, event_id)?.ok_or(AppError::NotFound)?;

    if let Some(error) = validate::validate_required(&form.role_label, "Role label", 200) {
        let _ = session.insert("flash", error);
        return Ok(HttpResponse::SeeOther()
            .insert_header(("Location", format!("/events/{event_id}/roster")))
            .finish());
    }

    // Stored as given; the roster search layer normalizes whatever shape
    // this carries at read time.
    let poc_json = form
        .poc_json
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let capacity = form
        .capacity
        .as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(0)
        .max(0);

    let new_role = role::NewRole {
        event_id,
        role_label: form.role_label.trim(),
        shift_start: form.shift_start.as_deref().unwrap_or("").trim(),
        shift_end: form.shift_end.as_deref().unwrap_or("").trim(),
        capacity,
        poc_json,
    };
    let role_id = role::create(&conn, &new_role)?;

    let current_organizer_id = get_organizer_id(&session).unwrap_or(0);
    let details = serde_json::json!({
        "event_id": event_id,
        "role_id": role_id,
        "summary": format!("Role '{}' added to event {}", form.role_label.trim(), event_id),
    });
    let _ = crate::audit::log(
        &conn,
        current_organizer_id,
        "event.role_added",
        "volunteer_role",
        role_id,
        details,
    );

    let _ = session.insert("flash", "Role added");
    Ok(HttpResponse::SeeOther()
        .insert_header(("Location", format!("/events/{event_id}/roster")))
        .finish())
}

// ---------------------------------------------------------------------------
// GET — close-event confirmation
// ---------------------------------------------------------------------------

/// GET /events/{id}/close — irreversible-action confirmation page with a
/// preview of how many signups would be marked no-show.
pub async fn close_confirm(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;
    let event_id = path.into_inner();
    let conn = pool.get()?;
    let ctx = PageContext::build(&session)?;

    let event = event::find_by_id(&conn, event_id)?.ok_or(AppError::NotFound)?;

    let no_show_preview = signup::find_rows_for_event(&conn, event_id)?
        .iter()
        .filter(|r| r.checked_in_at.is_none())
        .count() as i64;

    let tmpl = CloseConfirmTemplate {
        ctx,
        event,
        no_show_preview,
    };
    render(tmpl)
}

// ---------------------------------------------------------------------------
// POST — close event and resolve no-shows
// ---------------------------------------------------------------------------

/// POST /events/{id}/close — run the no-show batch, refresh the roster
/// cache from the store, and tell open consoles to reload.
pub async fn close(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<CloseForm>,
    registry: web::Data<RosterRegistry>,
    roster_hub: web::Data<hub::RosterHub>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "events.manage")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let event_id = path.into_inner();
    let conn = pool.get()?;
    let purge = form.purge_contacts.is_some();

    let report = no_show::resolve(&conn, event_id, purge)?.ok_or(AppError::NotFound)?;

    // The row set itself changed; re-seed from the store rather than patch.
    if registry.is_seeded(event_id) {
        registry.seed(event_id, signup::find_rows_for_event(&conn, event_id)?);
    }
    hub::broadcast_reload(&roster_hub, event_id);

    let current_organizer_id = get_organizer_id(&session).unwrap_or(0);
    let details = serde_json::json!({
        "event_id": event_id,
        "no_show_count": report.no_show_count,
        "removed_contacts": report.removed_contacts.len(),
        "summary": format!(
            "Event '{}' closed: {} no-shows, {} contacts removed",
            report.event_title,
            report.no_show_count,
            report.removed_contacts.len()
        ),
    });
    let _ = crate::audit::log(
        &conn,
        current_organizer_id,
        "event.closed",
        "event",
        event_id,
        details,
    );

    let ctx = PageContext::build(&session)?;
    let tmpl = CloseReportTemplate { ctx, report };
    render(tmpl)
}
