//! Ambient-layer tests — organizer auth, tier permissions, contact dedup,
//! role capacity counting, and the audit trail.

mod common;

use common::*;
use muster::auth::password;
use muster::models::{contact, organizer, signup};

#[test]
fn test_create_and_authenticate_organizer() {
    let (_dir, conn) = setup_test_db();

    let hash = password::hash_password("hunter2hunter2").expect("Failed to hash password");
    let id = organizer::create(
        &conn,
        &organizer::NewOrganizer {
            username: "dana".to_string(),
            password: hash,
            display_name: "Dana Reyes".to_string(),
            tier: "owner".to_string(),
        },
    )
    .expect("Failed to create organizer");
    assert!(id > 0);

    let found = organizer::find_by_username(&conn, "dana")
        .expect("Query failed")
        .expect("Organizer not found");
    assert_eq!(found.id, id);
    assert_eq!(found.tier, "owner");
    assert_eq!(
        password::verify_password("hunter2hunter2", &found.password),
        Ok(true)
    );
    assert_eq!(
        password::verify_password("wrong", &found.password),
        Ok(false)
    );

    assert!(
        organizer::find_by_username(&conn, "nobody")
            .expect("Query failed")
            .is_none()
    );
}

#[test]
fn test_tier_permission_codes() {
    let owner = organizer::permission_codes("owner");
    assert!(owner.contains(&"events.manage"));
    assert!(owner.contains(&"roster.checkin"));
    assert!(owner.contains(&"roster.annotate"));

    // The delegated tier can view and annotate, never check in directly.
    let poc = organizer::permission_codes("poc");
    assert!(poc.contains(&"roster.view"));
    assert!(poc.contains(&"roster.annotate"));
    assert!(!poc.contains(&"roster.checkin"));
    assert!(!poc.contains(&"events.manage"));

    assert!(organizer::permission_codes("unknown").is_empty());
}

#[test]
fn test_contact_dedup_ignores_phone_formatting() {
    let (_dir, conn) = setup_test_db();

    let first =
        contact::find_or_create(&conn, "Jo Marsh", "(313) 555-0100", "").expect("Create failed");
    let second =
        contact::find_or_create(&conn, "Jo Marsh", "313.555.0100", "jo@example.org")
            .expect("Create failed");
    assert_eq!(first, second, "same digits, same contact");

    let other =
        contact::find_or_create(&conn, "Jo Marsh", "(313) 555-0199", "").expect("Create failed");
    assert_ne!(first, other);

    assert_eq!(contact::count(&conn).expect("Count failed"), 2);
}

#[test]
fn test_contact_signup_counts_accumulate_across_events() {
    let (_dir, conn) = setup_test_db();
    let event_id = create_event(&conn);
    let role_id = create_role(&conn, event_id, "Trash pickup", None);

    create_signup(&conn, event_id, role_id, "Jo Marsh", "(313) 555-0100");
    create_signup(&conn, event_id, role_id, "Jo Marsh", "313-555-0100");

    let contacts = contact::find_all(&conn).expect("Fetch failed");
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].signup_count, 2);
}

#[test]
fn test_role_capacity_counting() {
    let (_dir, conn) = setup_test_db();
    let event_id = create_event(&conn);
    let role_id = create_role(&conn, event_id, "Registration table", None);

    assert_eq!(signup::count_for_role(&conn, role_id).expect("Count failed"), 0);
    create_signup(&conn, event_id, role_id, "Ada", "555-0101");
    create_signup(&conn, event_id, role_id, "Ben", "555-0102");
    assert_eq!(signup::count_for_role(&conn, role_id).expect("Count failed"), 2);
}

#[test]
fn test_audit_log_round_trip() {
    let (_dir, conn) = setup_test_db();

    muster::audit::log(
        &conn,
        1,
        "roster.check_in",
        "volunteer_signup",
        42,
        serde_json::json!({"summary": "Jo Marsh checked in"}),
    )
    .expect("Audit insert failed");

    let recent = muster::audit::find_recent(&conn, 5).expect("Fetch failed");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].action, "roster.check_in");
    assert_eq!(recent[0].summary, "Jo Marsh checked in");
    assert_eq!(muster::audit::count(&conn).expect("Count failed"), 1);
}
