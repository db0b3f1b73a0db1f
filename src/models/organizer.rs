use rusqlite::{Connection, params};

/// Internal organizer struct for authentication — includes password hash.
#[derive(Debug, Clone)]
pub struct Organizer {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub tier: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Permission codes granted to each organizer tier.
///
/// The `poc` tier is the delegated point-of-contact level: it can view the
/// roster and annotate volunteers (notes / running-late), but cannot perform
/// direct check-in writes or manage events.
pub fn permission_codes(tier: &str) -> &'static [&'static str] {
    match tier {
        "owner" => &[
            "events.manage",
            "roster.view",
            "roster.checkin",
            "roster.annotate",
            "contacts.view",
        ],
        "poc" => &["roster.view", "roster.annotate"],
        _ => &[],
    }
}

fn row_to_organizer(row: &rusqlite::Row) -> rusqlite::Result<Organizer> {
    Ok(Organizer {
        id: row.get("id")?,
        username: row.get("username")?,
        password: row.get("password")?,
        display_name: row.get("display_name")?,
        tier: row.get("tier")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Find organizer by username for authentication.
pub fn find_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<Organizer>> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password, display_name, tier, created_at, updated_at \
         FROM organizers WHERE username = ?1",
    )?;
    let mut rows = stmt.query_map(params![username], row_to_organizer)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

pub struct NewOrganizer {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub tier: String,
}

pub fn create(conn: &Connection, new: &NewOrganizer) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO organizers (username, password, display_name, tier) VALUES (?1, ?2, ?3, ?4)",
        params![new.username, new.password, new.display_name, new.tier],
    )?;
    Ok(conn.last_insert_rowid())
}
