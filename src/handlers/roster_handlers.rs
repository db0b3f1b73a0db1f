use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use chrono::Local;
use tokio::sync::mpsc;

use crate::auth::csrf;
use crate::auth::session::{get_organizer_id, get_permissions, require_permission};
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::signup::{CheckinAction, SignupRow};
use crate::models::{event, role, signup};
use crate::roster::RosterRegistry;
use crate::roster::cache::CheckinFields;
use crate::roster::hub::{self, RosterHub};
use crate::roster::search::{StatusFacet, build_search_text, matches};
use crate::roster::status::derive_status;
use crate::templates_structs::{PageContext, RosterRowView, RosterTemplate};

// ---------------------------------------------------------------------------
// Form / query structs
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

#[derive(serde::Deserialize)]
pub struct AnnotateForm {
    pub csrf_token: String,
    pub action: String,
    pub notes: Option<String>,
}

#[derive(serde::Deserialize)]
pub struct RosterQuery {
    pub q: Option<String>,
    pub facet: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Client-side clock for the optimistic patch. The store writes its own
/// timestamp; whichever lands in the cache last is what the console shows.
fn local_now() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn load_event_row(
    conn: &rusqlite::Connection,
    event_id: i64,
    signup_id: i64,
) -> Result<SignupRow, AppError> {
    let row = signup::find_row(conn, signup_id)?.ok_or(AppError::NotFound)?;
    if row.event_id != event_id {
        return Err(AppError::NotFound);
    }
    Ok(row)
}

fn ensure_seeded(
    conn: &rusqlite::Connection,
    registry: &RosterRegistry,
    event_id: i64,
) -> Result<(), AppError> {
    if !registry.is_seeded(event_id) {
        registry.seed(event_id, signup::find_rows_for_event(conn, event_id)?);
    }
    Ok(())
}

/// After a successful write: re-read the authoritative row, merge it through
/// the shared patch funnel, and deliver it on the push channel. The merge
/// outcome only governs the cache; the channel always carries the update —
/// per-consumer echo suppression happens where the patch is applied.
fn reconcile_and_push(
    conn: &rusqlite::Connection,
    registry: &RosterRegistry,
    roster_hub: &RosterHub,
    event_id: i64,
    signup_id: i64,
) -> Result<SignupRow, AppError> {
    let row = signup::find_row(conn, signup_id)?.ok_or(AppError::NotFound)?;
    registry.apply_remote(event_id, &row);
    hub::broadcast_row(roster_hub, &row);
    Ok(row)
}

fn ok_row_json(row: &SignupRow) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(
            serde_json::json!({"ok": true, "signup": row, "badge": derive_status(row)}).to_string(),
        )
}

fn rejected_json(reason: &str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .body(serde_json::json!({"ok": false, "error": reason}).to_string())
}

// ---------------------------------------------------------------------------
// GET — roster console
// ---------------------------------------------------------------------------

/// GET /events/{id}/roster — the check-in console. The full fetch here
/// seeds the in-memory roster cache for the event.
pub async fn console(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    registry: web::Data<RosterRegistry>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "roster.view")?;
    let event_id = path.into_inner();
    let conn = pool.get()?;
    let ctx = PageContext::build(&session)?;

    let event = event::find_by_id(&conn, event_id)?.ok_or(AppError::NotFound)?;
    let roles = role::find_by_event(&conn, event_id)?;
    let rows = signup::find_rows_for_event(&conn, event_id)?;
    registry.seed(event_id, rows.clone());

    let checked_in_count = rows
        .iter()
        .filter(|r| r.checked_in_at.is_some() && r.checked_out_at.is_none())
        .count();
    let total_count = rows.len();
    let row_views = rows
        .into_iter()
        .map(|row| RosterRowView {
            badge: derive_status(&row),
            row,
        })
        .collect();

    let tmpl = RosterTemplate {
        ctx,
        event,
        roles,
        rows: row_views,
        checked_in_count,
        total_count,
    };
    render(tmpl)
}

// ---------------------------------------------------------------------------
// GET — roster JSON (search + facet, re-run per keystroke)
// ---------------------------------------------------------------------------

/// GET /events/{id}/roster.json?q=&facet= — filtered projection of the
/// cache. Both filters are pure and run over the full in-memory roster; the
/// aggregate counts always cover the unfiltered cache.
pub async fn roster_json(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    query: web::Query<RosterQuery>,
    registry: web::Data<RosterRegistry>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "roster.view")?;
    let event_id = path.into_inner();
    let conn = pool.get()?;

    ensure_seeded(&conn, &registry, event_id)?;
    let rows = registry.snapshot(event_id).unwrap_or_default();

    let roles = role::find_by_event(&conn, event_id)?;
    let q = query.q.as_deref().unwrap_or("");
    let facet = StatusFacet::parse(query.facet.as_deref().unwrap_or("all"));

    let checked_in = rows
        .iter()
        .filter(|r| r.checked_in_at.is_some() && r.checked_out_at.is_none())
        .count();
    let total = rows.len();

    let filtered: Vec<serde_json::Value> = rows
        .iter()
        .filter(|row| {
            let role = roles.iter().find(|r| r.id == row.role_id);
            facet.matches(row) && matches(&build_search_text(row, role), q)
        })
        .map(|row| serde_json::json!({"signup": row, "badge": derive_status(row)}))
        .collect();

    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .body(
            serde_json::json!({
                "ok": true,
                "total": total,
                "checked_in": checked_in,
                "rows": filtered,
            })
            .to_string(),
        ))
}

// ---------------------------------------------------------------------------
// POST — check-in
// ---------------------------------------------------------------------------

/// POST /events/{id}/roster/{sid}/check-in
pub async fn check_in(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<(i64, i64)>,
    form: web::Form<CsrfOnly>,
    registry: web::Data<RosterRegistry>,
    roster_hub: web::Data<RosterHub>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "roster.checkin")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let (event_id, signup_id) = path.into_inner();
    let conn = pool.get()?;

    let row = load_event_row(&conn, event_id, signup_id)?;
    if row.checked_in_at.is_some() && row.checked_out_at.is_none() {
        return Ok(rejected_json("Already checked in"));
    }

    // A re-check-in after a check-out clears the departure.
    let affected = signup::check_in(&conn, signup_id)?;
    if affected == 0 {
        return Err(AppError::NotFound);
    }

    ensure_seeded(&conn, &registry, event_id)?;
    registry.apply_local(
        event_id,
        signup_id,
        &CheckinFields {
            checked_in_at: Some(local_now()),
            checked_out_at: None,
            check_in_notes: row.check_in_notes.clone(),
        },
    );
    let updated = reconcile_and_push(&conn, &registry, &roster_hub, event_id, signup_id)?;

    let current_organizer_id = get_organizer_id(&session).unwrap_or(0);
    let details = serde_json::json!({
        "event_id": event_id,
        "signup_id": signup_id,
        "summary": format!("{} checked in", updated.name),
    });
    let _ = crate::audit::log(
        &conn,
        current_organizer_id,
        "roster.check_in",
        "volunteer_signup",
        signup_id,
        details,
    );

    Ok(ok_row_json(&updated))
}

// ---------------------------------------------------------------------------
// POST — check-out
// ---------------------------------------------------------------------------

/// POST /events/{id}/roster/{sid}/check-out
pub async fn check_out(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<(i64, i64)>,
    form: web::Form<CsrfOnly>,
    registry: web::Data<RosterRegistry>,
    roster_hub: web::Data<RosterHub>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "roster.checkin")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let (event_id, signup_id) = path.into_inner();
    let conn = pool.get()?;

    let row = load_event_row(&conn, event_id, signup_id)?;
    if row.checked_in_at.is_none() {
        // The store itself would accept this write; the console is where the
        // never-checked-in shape is kept out of the data.
        return Ok(rejected_json("Not checked in yet"));
    }

    let affected = signup::check_out(&conn, signup_id)?;
    if affected == 0 {
        return Err(AppError::NotFound);
    }

    ensure_seeded(&conn, &registry, event_id)?;
    registry.apply_local(
        event_id,
        signup_id,
        &CheckinFields {
            checked_in_at: row.checked_in_at.clone(),
            checked_out_at: Some(local_now()),
            check_in_notes: row.check_in_notes.clone(),
        },
    );
    let updated = reconcile_and_push(&conn, &registry, &roster_hub, event_id, signup_id)?;

    let current_organizer_id = get_organizer_id(&session).unwrap_or(0);
    let details = serde_json::json!({
        "event_id": event_id,
        "signup_id": signup_id,
        "summary": format!("{} checked out", updated.name),
    });
    let _ = crate::audit::log(
        &conn,
        current_organizer_id,
        "roster.check_out",
        "volunteer_signup",
        signup_id,
        details,
    );

    Ok(ok_row_json(&updated))
}

// ---------------------------------------------------------------------------
// POST — annotate (notes / running-late), the delegated-tier path
// ---------------------------------------------------------------------------

/// POST /events/{id}/roster/{sid}/annotate — routed through the procedure
/// write path so point-of-contact operators without direct check-in rights
/// can still annotate volunteers.
pub async fn annotate(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<(i64, i64)>,
    form: web::Form<AnnotateForm>,
    registry: web::Data<RosterRegistry>,
    roster_hub: web::Data<RosterHub>,
) -> Result<HttpResponse, AppError> {
    require_permission(&session, "roster.annotate")?;
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let Some(action) = CheckinAction::parse(&form.action) else {
        return Ok(rejected_json("Unknown annotate action"));
    };

    let (event_id, signup_id) = path.into_inner();
    let conn = pool.get()?;

    let row = load_event_row(&conn, event_id, signup_id)?;

    let notes = form
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let affected = signup::update_checkin_status(&conn, signup_id, action, notes)?;
    if affected == 0 {
        return Err(AppError::NotFound);
    }

    ensure_seeded(&conn, &registry, event_id)?;
    let fields = match action {
        CheckinAction::Notes => CheckinFields {
            checked_in_at: row.checked_in_at.clone(),
            checked_out_at: row.checked_out_at.clone(),
            check_in_notes: notes.map(String::from),
        },
        // Running-late overrides any check-in, optimistic or stored.
        CheckinAction::RunningLate => CheckinFields {
            checked_in_at: None,
            checked_out_at: row.checked_out_at.clone(),
            check_in_notes: Some(signup::RUNNING_LATE_NOTE.to_string()),
        },
    };
    registry.apply_local(event_id, signup_id, &fields);
    let updated = reconcile_and_push(&conn, &registry, &roster_hub, event_id, signup_id)?;

    let current_organizer_id = get_organizer_id(&session).unwrap_or(0);
    let details = serde_json::json!({
        "event_id": event_id,
        "signup_id": signup_id,
        "action": action.as_str(),
        "summary": format!("{} annotated ({})", updated.name, action.as_str()),
    });
    let _ = crate::audit::log(
        &conn,
        current_organizer_id,
        "roster.annotated",
        "volunteer_signup",
        signup_id,
        details,
    );

    Ok(ok_row_json(&updated))
}

// ---------------------------------------------------------------------------
// WebSocket — the push channel
// ---------------------------------------------------------------------------

/// GET /events/{id}/roster/ws — console subscription, scoped to one event.
/// Torn down on disconnect; when the last subscriber for an event goes away
/// its roster cache is discarded with it.
pub async fn ws_connect(
    req: HttpRequest,
    body: web::Payload,
    session: Session,
    path: web::Path<i64>,
    registry: web::Data<RosterRegistry>,
    roster_hub: web::Data<RosterHub>,
) -> Result<HttpResponse, actix_web::Error> {
    let event_id = path.into_inner();
    let authorized = get_permissions(&session)
        .map(|p| p.has("roster.view"))
        .unwrap_or(false);
    if !authorized {
        return Ok(HttpResponse::Unauthorized().finish());
    }

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, body)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    hub::subscribe(&roster_hub, event_id, tx);

    let hub_clone = roster_hub.into_inner().clone();
    let registry_clone = registry.into_inner().clone();

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                Some(msg) = rx.recv() => {
                    if ws_session.text(msg).await.is_err() {
                        break;
                    }
                }
                Some(Ok(msg)) = msg_stream.recv() => {
                    match msg {
                        Message::Ping(bytes) => {
                            if ws_session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        Message::Text(_) => {
                            // Console actions go over HTTP POST, not WS
                        }
                        _ => {}
                    }
                }
                else => break,
            }
        }

        // Clean up on disconnect; drop the cache with the last subscriber
        if hub::prune(&hub_clone, event_id) {
            registry_clone.drop_event(event_id);
        }
    });

    Ok(response)
}
