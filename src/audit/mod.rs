use rusqlite::{Connection, params};
use serde_json::Value;

/// One audit entry, newest-first on the dashboard.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub organizer_id: i64,
    pub action: String,
    pub summary: String,
    pub created_at: String,
}

/// Entries older than this are pruned on startup.
const RETENTION_DAYS: i64 = 90;

/// Record a mutating action. Failures are logged, never propagated — the
/// triggering operation must not fail because its audit insert did.
pub fn log(
    conn: &Connection,
    organizer_id: i64,
    action: &str,
    target_type: &str,
    target_id: i64,
    details: Value,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO audit_log (organizer_id, action, target_type, target_id, details) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![organizer_id, action, target_type, target_id, details.to_string()],
    )?;
    Ok(())
}

/// Most recent entries with a display summary pulled from the details JSON.
pub fn find_recent(conn: &Connection, limit: i64) -> rusqlite::Result<Vec<AuditEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, organizer_id, action, details, created_at \
         FROM audit_log ORDER BY id DESC LIMIT ?1",
    )?;
    let entries = stmt
        .query_map(params![limit], |row| {
            let details: String = row.get("details")?;
            let summary = serde_json::from_str::<Value>(&details)
                .ok()
                .and_then(|v| v.get("summary").and_then(|s| s.as_str()).map(String::from))
                .unwrap_or_default();
            Ok(AuditEntry {
                id: row.get("id")?,
                organizer_id: row.get("organizer_id")?,
                action: row.get("action")?,
                summary,
                created_at: row.get("created_at")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(entries)
}

pub fn count(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM audit_log", [], |row| row.get(0))
}

/// Prune entries past the retention window.
pub fn cleanup_old_entries(conn: &Connection) {
    let cutoff = format!("-{RETENTION_DAYS} days");
    match conn.execute(
        "DELETE FROM audit_log WHERE created_at < strftime('%Y-%m-%dT%H:%M:%S','now', ?1)",
        params![cutoff],
    ) {
        Ok(0) => {}
        Ok(n) => log::info!("Pruned {n} audit entries past retention"),
        Err(e) => log::error!("Audit cleanup failed: {e}"),
    }
}
