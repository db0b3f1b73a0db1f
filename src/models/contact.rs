use rusqlite::{Connection, params};

/// One person, accumulated across events. Signups point here so a returning
/// volunteer keeps a single record.
#[derive(Debug, Clone)]
pub struct Contact {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub created_at: String,
    pub signup_count: i64,
}

fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Find an existing contact by digits-only phone match, or create one.
/// A contact with no phone digits is never matched, always created fresh.
pub fn find_or_create(
    conn: &Connection,
    name: &str,
    phone: &str,
    email: &str,
) -> rusqlite::Result<i64> {
    let digits = digits_only(phone);
    if !digits.is_empty() {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM contacts WHERE phone_digits = ?1",
                params![digits],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        if let Some(id) = existing {
            return Ok(id);
        }
    }

    conn.execute(
        "INSERT INTO contacts (name, phone, phone_digits, email) VALUES (?1, ?2, ?3, ?4)",
        params![name, phone, digits, email],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All contacts with how many signups each has accumulated, newest first.
pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<Contact>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.phone, c.email, c.created_at, \
                (SELECT COUNT(*) FROM volunteer_signups s WHERE s.contact_id = c.id) AS signup_count \
         FROM contacts c ORDER BY c.id DESC",
    )?;
    let contacts = stmt
        .query_map([], |row| {
            Ok(Contact {
                id: row.get("id")?,
                name: row.get("name")?,
                phone: row.get("phone")?,
                email: row.get("email")?,
                created_at: row.get("created_at")?,
                signup_count: row.get("signup_count")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(contacts)
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM contacts", [], |row| row.get(0))
}
