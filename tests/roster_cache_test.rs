//! Roster cache merge tests — seeding, the remote/local patch paths, and
//! the shared registry funnel.

use muster::models::signup::SignupRow;
use muster::roster::RosterRegistry;
use muster::roster::cache::{CheckinFields, PatchOutcome, RosterCache};

fn row(id: i64, name: &str) -> SignupRow {
    SignupRow {
        id,
        event_id: 7,
        role_id: 1,
        role_label: "Registration table".to_string(),
        name: name.to_string(),
        phone: "555-0100".to_string(),
        checked_in_at: None,
        checked_out_at: None,
        check_in_notes: None,
    }
}

fn seeded_cache() -> RosterCache {
    let mut cache = RosterCache::new(7);
    cache.seed(vec![row(1, "Ada"), row(2, "Ben"), row(3, "Cleo")]);
    cache
}

#[test]
fn test_remote_patch_unknown_id_is_ignored() {
    let mut cache = seeded_cache();
    let before: Vec<SignupRow> = cache.rows().to_vec();

    let outcome = cache.apply_remote_patch(&row(99, "Phantom"));

    assert_eq!(outcome, PatchOutcome::Ignored);
    assert_eq!(cache.len(), 3, "no phantom row may be inserted");
    assert_eq!(cache.rows(), &before[..], "cache contents unchanged");
}

#[test]
fn test_remote_patch_identical_fields_is_unchanged() {
    let mut cache = seeded_cache();
    let before: Vec<SignupRow> = cache.rows().to_vec();

    // Echo of state the cache already holds — same three fields, even though
    // the identity fields differ (they are not compared or copied).
    let mut echo = row(2, "Ben, stale name");
    echo.role_label = "stale".to_string();
    let outcome = cache.apply_remote_patch(&echo);

    assert_eq!(outcome, PatchOutcome::Unchanged);
    assert_eq!(cache.rows(), &before[..]);
}

#[test]
fn test_remote_patch_copies_only_checkin_fields() {
    let mut cache = seeded_cache();

    let mut update = row(2, "renamed upstream");
    update.checked_in_at = Some("2026-09-12T09:05:00".to_string());
    let outcome = cache.apply_remote_patch(&update);

    assert_eq!(outcome, PatchOutcome::Applied);
    let patched = cache.get(2).expect("row 2 present");
    assert_eq!(patched.checked_in_at.as_deref(), Some("2026-09-12T09:05:00"));
    assert_eq!(patched.name, "Ben", "identity fields must not be patched");

    // Unrelated rows untouched
    assert_eq!(cache.get(1).expect("row 1"), &row(1, "Ada"));
    assert_eq!(cache.get(3).expect("row 3"), &row(3, "Cleo"));
}

#[test]
fn test_local_patch_is_last_writer_wins() {
    let mut cache = seeded_cache();

    let first = CheckinFields {
        checked_in_at: Some("2026-09-12T09:00:00".to_string()),
        checked_out_at: None,
        check_in_notes: None,
    };
    assert_eq!(cache.apply_local_patch(1, &first), PatchOutcome::Applied);

    let second = CheckinFields {
        checked_in_at: Some("2026-09-12T09:00:03".to_string()),
        checked_out_at: None,
        check_in_notes: Some("badge 14".to_string()),
    };
    assert_eq!(cache.apply_local_patch(1, &second), PatchOutcome::Applied);

    let patched = cache.get(1).expect("row 1 present");
    assert_eq!(patched.checked_in_at.as_deref(), Some("2026-09-12T09:00:03"));
    assert_eq!(patched.check_in_notes.as_deref(), Some("badge 14"));

    // Re-applying the same fields is a no-op
    assert_eq!(cache.apply_local_patch(1, &second), PatchOutcome::Unchanged);

    // Unknown id is ignored, not inserted
    assert_eq!(cache.apply_local_patch(42, &second), PatchOutcome::Ignored);
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_checked_in_count_follows_rule_one() {
    let mut cache = seeded_cache();
    assert_eq!(cache.checked_in_count(), 0);

    let arrived = CheckinFields {
        checked_in_at: Some("2026-09-12T09:00:00".to_string()),
        checked_out_at: None,
        check_in_notes: None,
    };
    cache.apply_local_patch(1, &arrived);
    cache.apply_local_patch(2, &arrived);
    assert_eq!(cache.checked_in_count(), 2);

    // A departure drops the row back out of the count
    let departed = CheckinFields {
        checked_in_at: Some("2026-09-12T09:00:00".to_string()),
        checked_out_at: Some("2026-09-12T11:30:00".to_string()),
        check_in_notes: None,
    };
    cache.apply_local_patch(2, &departed);
    assert_eq!(cache.checked_in_count(), 1);
}

#[test]
fn test_registry_funnels_both_patch_sources() {
    let registry = RosterRegistry::new();
    let fields = CheckinFields {
        checked_in_at: Some("2026-09-12T09:00:00".to_string()),
        checked_out_at: None,
        check_in_notes: None,
    };

    // Nothing seeded yet — both sources are ignored
    assert_eq!(registry.apply_local(7, 1, &fields), PatchOutcome::Ignored);
    assert_eq!(registry.apply_remote(7, &row(1, "Ada")), PatchOutcome::Ignored);
    assert!(registry.snapshot(7).is_none());

    registry.seed(7, vec![row(1, "Ada"), row(2, "Ben")]);
    assert!(registry.is_seeded(7));

    assert_eq!(registry.apply_local(7, 1, &fields), PatchOutcome::Applied);

    let mut authoritative = row(1, "Ada");
    authoritative.checked_in_at = Some("2026-09-12T09:00:01".to_string());
    assert_eq!(
        registry.apply_remote(7, &authoritative),
        PatchOutcome::Applied
    );

    let snapshot = registry.snapshot(7).expect("seeded");
    assert_eq!(
        snapshot[0].checked_in_at.as_deref(),
        Some("2026-09-12T09:00:01"),
        "authoritative value lands last"
    );

    registry.drop_event(7);
    assert!(!registry.is_seeded(7));
}
