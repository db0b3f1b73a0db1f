//! Shared test infrastructure for model and roster tests.
//!
//! `setup_test_db()` builds a temporary SQLite database from the crate's
//! migrations. The create_* helpers insert fixture rows through the same
//! model functions the application uses.

use rusqlite::Connection;
use tempfile::TempDir;

use muster::db::MIGRATIONS;
use muster::models::{contact, event, role, signup};

#[allow(dead_code)]
pub const TEST_EVENT_TITLE: &str = "Riverside Park Cleanup";
#[allow(dead_code)]
pub const TEST_EVENT_DATE: &str = "2026-09-12";

/// Setup a test database with schema applied.
///
/// Returns a tuple of (TempDir, Connection) where TempDir must be kept
/// alive for the Connection to remain valid.
pub fn setup_test_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let conn = Connection::open(&db_path).expect("Failed to open test DB");

    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
        .expect("Failed to set pragmas");

    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");

    (dir, conn)
}

#[allow(dead_code)]
pub fn create_event(conn: &Connection) -> i64 {
    event::create(conn, TEST_EVENT_TITLE, TEST_EVENT_DATE, "Riverside Park")
        .expect("Failed to create event")
}

#[allow(dead_code)]
pub fn create_role(conn: &Connection, event_id: i64, label: &str, poc_json: Option<&str>) -> i64 {
    role::create(
        conn,
        &role::NewRole {
            event_id,
            role_label: label,
            shift_start: "09:00",
            shift_end: "12:00",
            capacity: 0,
            poc_json,
        },
    )
    .expect("Failed to create role")
}

#[allow(dead_code)]
pub fn create_signup(conn: &Connection, event_id: i64, role_id: i64, name: &str, phone: &str) -> i64 {
    let contact_id =
        contact::find_or_create(conn, name, phone, "").expect("Failed to create contact");
    signup::create(
        conn,
        &signup::NewSignup {
            event_id,
            role_id,
            contact_id,
            name,
            phone,
        },
    )
    .expect("Failed to create signup")
}
