use actix_session::Session;
use askama::Template;

use crate::audit::AuditEntry;
use crate::auth::csrf;
use crate::auth::session::{Permissions, get_permissions, get_username, take_flash};
use crate::errors::AppError;
use crate::models::contact::Contact;
use crate::models::event::{Event, EventListItem};
use crate::models::no_show::NoShowReport;
use crate::models::role::RoleRow;
use crate::models::signup::SignupRow;
use crate::roster::status::StatusBadge;

pub const APP_NAME: &str = "Muster";

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.permissions`, etc.
pub struct PageContext {
    pub username: String,
    pub avatar_initial: String,
    pub permissions: Permissions,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session) -> Result<Self, AppError> {
        let username = get_username(session)
            .map_err(|e| AppError::Session(format!("Failed to get username: {e}")))?;
        let permissions = get_permissions(session)
            .map_err(|e| AppError::Session(format!("Failed to get permissions: {e}")))?;
        let flash = take_flash(session);
        let csrf_token = csrf::get_or_create_token(session);
        let avatar_initial = username
            .chars()
            .next()
            .unwrap_or('?')
            .to_uppercase()
            .to_string();
        Ok(Self {
            username,
            avatar_initial,
            permissions,
            flash,
            app_name: APP_NAME.to_string(),
            csrf_token,
        })
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub greeting: String,
    pub open_event_count: i64,
    pub signup_count: i64,
    pub contact_count: i64,
    pub audit_entry_count: i64,
    pub recent_activity: Vec<AuditEntry>,
}

#[derive(Template)]
#[template(path = "events/list.html")]
pub struct EventListTemplate {
    pub ctx: PageContext,
    pub events: Vec<EventListItem>,
}

#[derive(Template)]
#[template(path = "events/form.html")]
pub struct EventFormTemplate {
    pub ctx: PageContext,
    pub error: Option<String>,
}

/// One roster line: the signup plus its derived badge.
pub struct RosterRowView {
    pub row: SignupRow,
    pub badge: StatusBadge,
}

#[derive(Template)]
#[template(path = "events/roster.html")]
pub struct RosterTemplate {
    pub ctx: PageContext,
    pub event: Event,
    pub roles: Vec<RoleRow>,
    pub rows: Vec<RosterRowView>,
    pub checked_in_count: usize,
    pub total_count: usize,
}

#[derive(Template)]
#[template(path = "events/close_confirm.html")]
pub struct CloseConfirmTemplate {
    pub ctx: PageContext,
    pub event: Event,
    pub no_show_preview: i64,
}

#[derive(Template)]
#[template(path = "events/close_report.html")]
pub struct CloseReportTemplate {
    pub ctx: PageContext,
    pub report: NoShowReport,
}

#[derive(Template)]
#[template(path = "public/event.html")]
pub struct PublicEventTemplate {
    pub event: Event,
    pub roles: Vec<RoleRow>,
    pub error: Option<String>,
    pub submitted: bool,
    pub csrf_token: String,
}

#[derive(Template)]
#[template(path = "contacts/list.html")]
pub struct ContactListTemplate {
    pub ctx: PageContext,
    pub contacts: Vec<Contact>,
}
