//! Status derivation tests — the three-state priority rule over the
//! check-in fields.

use muster::models::signup::SignupRow;
use muster::roster::status::{CheckinStatus, derive_status};

fn signup(
    checked_in_at: Option<&str>,
    checked_out_at: Option<&str>,
    check_in_notes: Option<&str>,
) -> SignupRow {
    SignupRow {
        id: 1,
        event_id: 1,
        role_id: 1,
        role_label: "Trash pickup".to_string(),
        name: "Jo Marsh".to_string(),
        phone: "(313) 555-0100".to_string(),
        checked_in_at: checked_in_at.map(String::from),
        checked_out_at: checked_out_at.map(String::from),
        check_in_notes: check_in_notes.map(String::from),
    }
}

#[test]
fn test_checked_in_iff_arrived_and_not_departed() {
    let s = signup(Some("2026-09-12T09:02:11"), None, None);
    assert_eq!(derive_status(&s).status, CheckinStatus::CheckedIn);

    // Departed — no longer checked-in, and no fourth state either.
    let s = signup(Some("2026-09-12T09:02:11"), Some("2026-09-12T11:40:00"), None);
    assert_eq!(derive_status(&s).status, CheckinStatus::NotCheckedIn);

    let s = signup(None, None, None);
    assert_eq!(derive_status(&s).status, CheckinStatus::NotCheckedIn);
}

#[test]
fn test_running_late_requires_marker_substring() {
    let s = signup(None, None, Some("Running late"));
    assert_eq!(derive_status(&s).status, CheckinStatus::RunningLate);

    // Case-insensitive, and tolerated inside a longer note.
    let s = signup(None, None, Some("  called: RUNNING LATE, eta 9:30 "));
    assert_eq!(derive_status(&s).status, CheckinStatus::RunningLate);

    // Arbitrary lateness language is NOT the marker.
    let s = signup(None, None, Some("will be 10 min late"));
    assert_eq!(derive_status(&s).status, CheckinStatus::NotCheckedIn);
}

#[test]
fn test_checked_in_wins_over_running_late_note() {
    // Rule 1 outranks the notes sniff: an arrived volunteer whose note still
    // says running late shows as checked in.
    let s = signup(Some("2026-09-12T09:02:11"), None, Some("Running late"));
    assert_eq!(derive_status(&s).status, CheckinStatus::CheckedIn);
}

#[test]
fn test_defective_checkout_without_checkin_is_not_checked_in() {
    // The store accepts this shape; display must never count it as arrived.
    let s = signup(None, Some("2026-09-12T11:40:00"), None);
    assert_eq!(derive_status(&s).status, CheckinStatus::NotCheckedIn);

    // Unless the note carries the marker, in which case rule 2 applies.
    let s = signup(None, Some("2026-09-12T11:40:00"), Some("running late"));
    assert_eq!(derive_status(&s).status, CheckinStatus::RunningLate);
}

#[test]
fn test_every_shape_lands_in_exactly_one_state() {
    let timestamps = [None, Some("2026-09-12T09:00:00")];
    let notes = [None, Some("Running late"), Some("bringing gloves")];

    for checked_in in timestamps {
        for checked_out in timestamps {
            for note in notes {
                let badge = derive_status(&signup(checked_in, checked_out, note));
                let states = [
                    CheckinStatus::CheckedIn,
                    CheckinStatus::RunningLate,
                    CheckinStatus::NotCheckedIn,
                ];
                assert_eq!(
                    states.iter().filter(|s| **s == badge.status).count(),
                    1,
                    "signup ({checked_in:?}, {checked_out:?}, {note:?}) must map to one state"
                );
                assert!(!badge.label.is_empty());
                assert!(!badge.variant.is_empty());
            }
        }
    }
}
