use rusqlite::{Connection, params};

/// A time-boxed volunteer role within one event.
///
/// `poc_json` is passed through raw; the roster search layer normalizes the
/// legacy point-of-contact shapes it may contain.
#[derive(Debug, Clone)]
pub struct RoleRow {
    pub id: i64,
    pub event_id: i64,
    pub role_label: String,
    pub shift_start: String,
    pub shift_end: String,
    pub capacity: i64,
    pub poc_json: Option<String>,
    pub signup_count: i64,
}

const ROLE_SELECT: &str = "\
SELECT r.id, r.event_id, r.role_label, r.shift_start, r.shift_end, r.capacity, r.poc_json, \
       (SELECT COUNT(*) FROM volunteer_signups s WHERE s.role_id = r.id) AS signup_count \
FROM volunteer_roles r";

fn map_role_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RoleRow> {
    Ok(RoleRow {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        role_label: row.get("role_label")?,
        shift_start: row.get("shift_start")?,
        shift_end: row.get("shift_end")?,
        capacity: row.get("capacity")?,
        poc_json: row.get("poc_json")?,
        signup_count: row.get("signup_count")?,
    })
}

pub fn find_by_event(conn: &Connection, event_id: i64) -> rusqlite::Result<Vec<RoleRow>> {
    let sql = format!("{ROLE_SELECT} WHERE r.event_id = ?1 ORDER BY r.shift_start, r.id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![event_id], map_role_row)?;
    rows.collect()
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<RoleRow>> {
    let sql = format!("{ROLE_SELECT} WHERE r.id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![id], map_role_row)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub struct NewRole<'a> {
    pub event_id: i64,
    pub role_label: &'a str,
    pub shift_start: &'a str,
    pub shift_end: &'a str,
    pub capacity: i64,
    pub poc_json: Option<&'a str>,
}

pub fn create(conn: &Connection, new: &NewRole) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO volunteer_roles (event_id, role_label, shift_start, shift_end, capacity, poc_json) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.event_id,
            new.role_label,
            new.shift_start,
            new.shift_end,
            new.capacity,
            new.poc_json
        ],
    )?;
    Ok(conn.last_insert_rowid())
}
