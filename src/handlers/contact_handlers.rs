use actix_session::Session;
use actix_web::{HttpResponse, web};

use crate::auth::session::require_permission;
use crate::db::DbPool;
use crate::errors::{AppError, render};
use crate::models::contact;
use crate::templates_structs::{ContactListTemplate, PageContext};

/// GET /contacts — every contact accumulated across events.
pub async fn list(pool: web::Data<DbPool>, session: Session) -> Result<HttpResponse, AppError> {
    require_permission(&session, "contacts.view")?;
    let conn = pool.get()?;
    let ctx = PageContext::build(&session)?;

    let contacts = contact::find_all(&conn)?;

    let tmpl = ContactListTemplate { ctx, contacts };
    render(tmpl)
}
