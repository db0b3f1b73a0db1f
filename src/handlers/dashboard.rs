use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Local, Timelike};

use crate::audit;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::{contact, event, signup};
use crate::templates_structs::{DashboardTemplate, PageContext};

fn time_greeting(username: &str) -> String {
    let hour = Local::now().hour();
    let period = match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    format!("{period}, {username}")
}

pub async fn index(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    let conn = pool.get()?;
    let ctx = PageContext::build(&session)?;

    let greeting = time_greeting(&ctx.username);
    let open_event_count = event::count_by_status(&conn, "open")?;
    let signup_count = signup::count_all(&conn)?;
    let contact_count = contact::count(&conn)?;
    let audit_entry_count = audit::count(&conn)?;
    let recent_activity = audit::find_recent(&conn, 5).unwrap_or_default();

    let tmpl = DashboardTemplate {
        ctx,
        greeting,
        open_event_count,
        signup_count,
        contact_count,
        audit_entry_count,
        recent_activity,
    };
    render(tmpl)
}
