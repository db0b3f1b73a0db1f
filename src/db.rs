use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = SqliteConnectionManager::file(database_url).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    });
    Pool::builder()
        .max_size(8)
        .build(manager)
        .expect("Failed to create DB pool")
}

pub fn run_migrations(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Seed the default owner account if no organizers exist yet.
pub fn seed_admin(pool: &DbPool, admin_password_hash: &str) {
    let conn = pool.get().expect("Failed to get DB connection for seeding");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM organizers", [], |row| row.get(0))
        .unwrap_or(0);
    if count > 0 {
        log::info!("Organizers already seeded ({count}), skipping admin seed");
        return;
    }

    conn.execute(
        "INSERT INTO organizers (username, password, display_name, tier) \
         VALUES ('admin', ?1, 'Administrator', 'owner')",
        params![admin_password_hash],
    )
    .expect("Failed to seed admin organizer");
    log::info!("Seeded default admin organizer");
}

/// Seed a demo event with roles, signups, and a delegated point-of-contact
/// organizer (enabled via MUSTER_SEED_DEMO=1).
pub fn seed_demo(pool: &DbPool, demo_password_hash: &str) {
    let conn = pool.get().expect("Failed to get DB connection for demo seed");

    let has_demo: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM events WHERE title = 'Riverside Park Cleanup'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    if has_demo {
        log::info!("Demo data already present, skipping");
        return;
    }

    conn.execute(
        "INSERT INTO events (title, event_date, location) \
         VALUES ('Riverside Park Cleanup', '2026-09-12', 'Riverside Park, north gate')",
        [],
    )
    .expect("Failed to seed demo event");
    let event_id = conn.last_insert_rowid();

    let roles: [(&str, &str, &str, i64, Option<&str>); 3] = [
        (
            "Trash pickup",
            "09:00",
            "12:00",
            12,
            Some(r#"{"poc_contacts":[{"name":"Dana Reyes","email":"dana@riversidecleanup.org","phone":"(313) 555-0188"}]}"#),
        ),
        (
            "Registration table",
            "08:30",
            "11:00",
            4,
            Some(r#"{"poc_contact":{"name":"Sam Okafor","email":"sam@riversidecleanup.org"}}"#),
        ),
        ("Supply runner", "09:00", "13:00", 6, None),
    ];
    let mut role_ids = Vec::new();
    for (label, start, end, capacity, poc) in roles {
        conn.execute(
            "INSERT INTO volunteer_roles (event_id, role_label, shift_start, shift_end, capacity, poc_json) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![event_id, label, start, end, capacity, poc],
        )
        .expect("Failed to seed demo role");
        role_ids.push(conn.last_insert_rowid());
    }

    let volunteers: [(&str, &str); 3] = [
        ("Jo Marsh", "(313) 555-0100"),
        ("Priya Nair", "313-555-0142"),
        ("Theo Banks", "(248) 555-0166"),
    ];
    for (i, (name, phone)) in volunteers.iter().enumerate() {
        let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
        conn.execute(
            "INSERT INTO contacts (name, phone, phone_digits) VALUES (?1, ?2, ?3)",
            params![name, phone, digits],
        )
        .expect("Failed to seed demo contact");
        let contact_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO volunteer_signups (event_id, role_id, contact_id, name, phone) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![event_id, role_ids[i % role_ids.len()], contact_id, name, phone],
        )
        .expect("Failed to seed demo signup");
    }

    // A delegated point-of-contact login (can annotate, cannot check in)
    conn.execute(
        "INSERT INTO organizers (username, password, display_name, tier) \
         VALUES ('dana', ?1, 'Dana Reyes', 'poc')",
        params![demo_password_hash],
    )
    .expect("Failed to seed demo organizer");

    log::info!("Demo seed complete (event {event_id})");
}
