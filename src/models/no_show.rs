use rusqlite::{Connection, params};

/// A contact purged by the no-show cleanup, echoed back in the report so the
/// operator sees exactly what the irreversible step removed.
#[derive(Debug, Clone)]
pub struct RemovedContact {
    pub id: i64,
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct NoShowReport {
    pub event_title: String,
    pub no_show_count: i64,
    pub removed_contacts: Vec<RemovedContact>,
}

/// Close-event batch: partition the event's signups into attended and
/// no-show, optionally purge no-show contacts, and mark the event closed.
///
/// A contact is purged only when it has no attended signup anywhere — one
/// check-in at any event, past or present, keeps the record. Deleting a
/// contact cascades to its signups, which is how no-show rows leave the
/// roster. Returns None when the event does not exist.
pub fn resolve(
    conn: &Connection,
    event_id: i64,
    purge_contacts: bool,
) -> rusqlite::Result<Option<NoShowReport>> {
    let event_title: Option<String> = conn
        .query_row(
            "SELECT title FROM events WHERE id = ?1",
            params![event_id],
            |row| row.get(0),
        )
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })?;
    let Some(event_title) = event_title else {
        return Ok(None);
    };

    let tx = conn.unchecked_transaction()?;

    let no_show_count: i64 = tx.query_row(
        "SELECT COUNT(*) FROM volunteer_signups WHERE event_id = ?1 AND checked_in_at IS NULL",
        params![event_id],
        |row| row.get(0),
    )?;

    let mut removed_contacts = Vec::new();
    if purge_contacts {
        let mut stmt = tx.prepare(
            "SELECT DISTINCT c.id, c.name, c.phone \
             FROM contacts c \
             JOIN volunteer_signups s ON s.contact_id = c.id \
             WHERE s.event_id = ?1 AND s.checked_in_at IS NULL \
               AND NOT EXISTS (SELECT 1 FROM volunteer_signups s2 \
                               WHERE s2.contact_id = c.id AND s2.checked_in_at IS NOT NULL) \
             ORDER BY c.id",
        )?;
        removed_contacts = stmt
            .query_map(params![event_id], |row| {
                Ok(RemovedContact {
                    id: row.get("id")?,
                    name: row.get("name")?,
                    phone: row.get("phone")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        for contact in &removed_contacts {
            tx.execute("DELETE FROM contacts WHERE id = ?1", params![contact.id])?;
        }
    }

    tx.execute(
        "UPDATE events SET status = 'closed', updated_at = strftime('%Y-%m-%dT%H:%M:%S','now') \
         WHERE id = ?1",
        params![event_id],
    )?;

    tx.commit()?;

    Ok(Some(NoShowReport {
        event_title,
        no_show_count,
        removed_contacts,
    }))
}
