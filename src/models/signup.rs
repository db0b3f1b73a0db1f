use rusqlite::{Connection, params};
use serde::Serialize;

/// The note text written by the running-late action. Status derivation keys
/// off a substring of this, so annotate is the only writer of the phrase.
pub const RUNNING_LATE_NOTE: &str = "Running late";

/// Read/write projection of one volunteer signup, as held by the roster
/// cache and shipped to the console (JSON API and push channel).
///
/// `checked_out_at` is only meaningful when `checked_in_at` is set; the
/// status derivation never maps the defective checked-out-without-check-in
/// shape to the checked-in state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRow {
    pub id: i64,
    pub event_id: i64,
    pub role_id: i64,
    pub role_label: String,
    pub name: String,
    pub phone: String,
    pub checked_in_at: Option<String>,
    pub checked_out_at: Option<String>,
    pub check_in_notes: Option<String>,
}

const SIGNUP_SELECT: &str = "\
SELECT s.id, s.event_id, s.role_id, COALESCE(r.role_label, '') AS role_label, \
       s.name, s.phone, s.checked_in_at, s.checked_out_at, s.check_in_notes \
FROM volunteer_signups s \
LEFT JOIN volunteer_roles r ON r.id = s.role_id";

fn map_signup_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SignupRow> {
    Ok(SignupRow {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        role_id: row.get("role_id")?,
        role_label: row.get("role_label")?,
        name: row.get("name")?,
        phone: row.get("phone")?,
        checked_in_at: row.get("checked_in_at")?,
        checked_out_at: row.get("checked_out_at")?,
        check_in_notes: row.get("check_in_notes")?,
    })
}

/// Full roster for one event — the initial load that seeds the cache.
pub fn find_rows_for_event(conn: &Connection, event_id: i64) -> rusqlite::Result<Vec<SignupRow>> {
    let sql = format!("{SIGNUP_SELECT} WHERE s.event_id = ?1 ORDER BY s.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![event_id], map_signup_row)?;
    rows.collect()
}

/// Authoritative post-write row, re-read after every mutation so the patch
/// funnel and the push channel carry what the store actually holds.
pub fn find_row(conn: &Connection, id: i64) -> rusqlite::Result<Option<SignupRow>> {
    let sql = format!("{SIGNUP_SELECT} WHERE s.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], map_signup_row)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub struct NewSignup<'a> {
    pub event_id: i64,
    pub role_id: i64,
    pub contact_id: i64,
    pub name: &'a str,
    pub phone: &'a str,
}

pub fn create(conn: &Connection, new: &NewSignup) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO volunteer_signups (event_id, role_id, contact_id, name, phone) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![new.event_id, new.role_id, new.contact_id, new.name, new.phone],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Direct check-in write. Sets the arrival timestamp and clears any prior
/// departure, so a re-check-in after a check-out lands back in the
/// checked-in state. Returns rows affected; 0 means the signup is gone and
/// the caller must surface that, not swallow it.
pub fn check_in(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE volunteer_signups \
         SET checked_in_at = strftime('%Y-%m-%dT%H:%M:%S','now'), checked_out_at = NULL \
         WHERE id = ?1",
        params![id],
    )
}

/// Direct check-out write. The never-checked-in precondition is enforced at
/// the console, not here, matching the narrow write path.
pub fn check_out(conn: &Connection, id: i64) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE volunteer_signups \
         SET checked_out_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?1",
        params![id],
    )
}

/// The annotate actions routed through the delegated permission tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinAction {
    Notes,
    RunningLate,
}

impl CheckinAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "notes" => Some(CheckinAction::Notes),
            "running_late" => Some(CheckinAction::RunningLate),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckinAction::Notes => "notes",
            CheckinAction::RunningLate => "running_late",
        }
    }
}

/// Procedure-style write path for operator annotations.
///
/// `Notes` touches only the notes field. `RunningLate` writes the marker
/// note AND forces `checked_in_at` back to null — running-late and
/// checked-in are mutually exclusive display states, so a prior check-in
/// (optimistic or stored) must not survive the override.
pub fn update_checkin_status(
    conn: &Connection,
    volunteer_id: i64,
    action: CheckinAction,
    notes: Option<&str>,
) -> rusqlite::Result<usize> {
    match action {
        CheckinAction::Notes => conn.execute(
            "UPDATE volunteer_signups SET check_in_notes = ?1 WHERE id = ?2",
            params![notes, volunteer_id],
        ),
        CheckinAction::RunningLate => conn.execute(
            "UPDATE volunteer_signups \
             SET check_in_notes = ?1, checked_in_at = NULL \
             WHERE id = ?2",
            params![RUNNING_LATE_NOTE, volunteer_id],
        ),
    }
}

pub fn count_for_role(conn: &Connection, role_id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM volunteer_signups WHERE role_id = ?1",
        params![role_id],
        |row| row.get(0),
    )
}

pub fn count_all(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM volunteer_signups", [], |row| row.get(0))
}
