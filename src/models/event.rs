use rusqlite::{Connection, params};

#[derive(Debug, Clone)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub event_date: String,
    pub location: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// For the event list page — event plus roster aggregates.
///
/// `checked_in_count` counts rows currently in the checked-in display state
/// (arrived and not yet departed), so a checked-out volunteer drops back out
/// of the count.
#[derive(Debug, Clone)]
pub struct EventListItem {
    pub id: i64,
    pub title: String,
    pub event_date: String,
    pub location: String,
    pub status: String,
    pub role_count: i64,
    pub signup_count: i64,
    pub checked_in_count: i64,
}

const EVENT_LIST_SELECT: &str = "\
SELECT e.id, e.title, e.event_date, e.location, e.status, \
       (SELECT COUNT(*) FROM volunteer_roles r WHERE r.event_id = e.id) AS role_count, \
       (SELECT COUNT(*) FROM volunteer_signups s WHERE s.event_id = e.id) AS signup_count, \
       (SELECT COUNT(*) FROM volunteer_signups s WHERE s.event_id = e.id \
          AND s.checked_in_at IS NOT NULL AND s.checked_out_at IS NULL) AS checked_in_count \
FROM events e";

fn map_event_list_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventListItem> {
    Ok(EventListItem {
        id: row.get("id")?,
        title: row.get("title")?,
        event_date: row.get("event_date")?,
        location: row.get("location")?,
        status: row.get("status")?,
        role_count: row.get("role_count")?,
        signup_count: row.get("signup_count")?,
        checked_in_count: row.get("checked_in_count")?,
    })
}

/// All events, newest first.
pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<EventListItem>> {
    let sql = format!("{EVENT_LIST_SELECT} ORDER BY e.event_date DESC, e.id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_event_list_row)?;
    rows.collect()
}

pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Event>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, event_date, location, status, created_at, updated_at \
         FROM events WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], |row| {
        Ok(Event {
            id: row.get("id")?,
            title: row.get("title")?,
            event_date: row.get("event_date")?,
            location: row.get("location")?,
            status: row.get("status")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    })?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub fn create(conn: &Connection, title: &str, event_date: &str, location: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO events (title, event_date, location) VALUES (?1, ?2, ?3)",
        params![title, event_date, location],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn count_by_status(conn: &Connection, status: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM events WHERE status = ?1",
        params![status],
        |row| row.get(0),
    )
}
