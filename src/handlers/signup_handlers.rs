use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::csrf;
use crate::auth::validate;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::{contact, event, role, signup};
use crate::roster::hub::{self, RosterHub};
use crate::templates_structs::PublicEventTemplate;

#[derive(serde::Deserialize)]
pub struct SignupForm {
    pub csrf_token: String,
    pub role_id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

fn event_page(
    conn: &rusqlite::Connection,
    session: &Session,
    event: event::Event,
    error: Option<String>,
    submitted: bool,
) -> Result<HttpResponse, AppError> {
    let roles = role::find_by_event(conn, event.id)?;
    let csrf_token = csrf::get_or_create_token(session);
    let tmpl = PublicEventTemplate {
        event,
        roles,
        error,
        submitted,
        csrf_token,
    };
    render(tmpl)
}

/// GET /e/{id} — public event page with the role signup form.
pub async fn show(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let event_id = path.into_inner();
    let conn = pool.get()?;
    let event = event::find_by_id(&conn, event_id)?.ok_or(AppError::NotFound)?;
    event_page(&conn, &session, event, None, false)
}

/// POST /e/{id}/signup — public signup for one role.
///
/// The contact record is matched on digits-only phone, so a returning
/// volunteer accumulates signups on one record. A freshly created signup
/// reaches open consoles via a reload, never via the row patch path.
pub async fn submit(
    pool: web::Data<DbPool>,
    session: Session,
    path: web::Path<i64>,
    form: web::Form<SignupForm>,
    roster_hub: web::Data<RosterHub>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    let event_id = path.into_inner();
    let conn = pool.get()?;
    let event = event::find_by_id(&conn, event_id)?.ok_or(AppError::NotFound)?;

    if event.status != "open" {
        let error = Some("This event is closed and no longer taking signups".to_string());
        return event_page(&conn, &session, event, error, false);
    }

    let error = validate::validate_required(&form.name, "Name", 200)
        .or_else(|| validate::validate_phone(&form.phone));
    if let Some(error) = error {
        return event_page(&conn, &session, event, Some(error), false);
    }

    let Some(role_row) = role::find_by_id(&conn, form.role_id)? else {
        return event_page(&conn, &session, event, Some("Unknown role".to_string()), false);
    };
    if role_row.event_id != event_id {
        return Err(AppError::NotFound);
    }
    if role_row.capacity > 0 && signup::count_for_role(&conn, role_row.id)? >= role_row.capacity {
        let error = Some(format!("'{}' is already full", role_row.role_label));
        return event_page(&conn, &session, event, error, false);
    }

    let name = form.name.trim();
    let phone = form.phone.trim();
    let email = form.email.as_deref().unwrap_or("").trim();

    let contact_id = contact::find_or_create(&conn, name, phone, email)?;
    let signup_id = signup::create(
        &conn,
        &signup::NewSignup {
            event_id,
            role_id: role_row.id,
            contact_id,
            name,
            phone,
        },
    )?;

    let details = serde_json::json!({
        "event_id": event_id,
        "signup_id": signup_id,
        "role_id": role_row.id,
        "summary": format!("{} signed up for '{}'", name, role_row.role_label),
    });
    let _ = crate::audit::log(&conn, 0, "signup.created", "volunteer_signup", signup_id, details);

    hub::broadcast_reload(&roster_hub, event_id);

    event_page(&conn, &session, event, None, true)
}
