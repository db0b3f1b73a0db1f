//! Search engine tests — blob construction, digit matching, the legacy
//! point-of-contact shapes, and the status facet.

use muster::models::role::RoleRow;
use muster::models::signup::SignupRow;
use muster::roster::search::{
    StatusFacet, build_search_text, digits_only, matches, normalize_poc_contacts,
};

fn signup(name: &str, phone: &str) -> SignupRow {
    SignupRow {
        id: 1,
        event_id: 1,
        role_id: 5,
        role_label: "Trash pickup".to_string(),
        name: name.to_string(),
        phone: phone.to_string(),
        checked_in_at: None,
        checked_out_at: None,
        check_in_notes: None,
    }
}

fn role_with_poc(poc_json: &str) -> RoleRow {
    RoleRow {
        id: 5,
        event_id: 1,
        role_label: "Trash pickup".to_string(),
        shift_start: "09:00".to_string(),
        shift_end: "12:00".to_string(),
        capacity: 0,
        poc_json: Some(poc_json.to_string()),
        signup_count: 0,
    }
}

#[test]
fn test_phone_search_across_punctuation() {
    let s = signup("Jo Marsh", "(313) 555-0100");
    let blob = build_search_text(&s, None);

    assert!(matches(&blob, "313"));
    assert!(matches(&blob, "3135550100"));
    assert!(matches(&blob, "(313)"));
    assert!(!matches(&blob, "999"));
}

#[test]
fn test_name_and_role_match_case_insensitive() {
    let s = signup("Jo  Marsh", "555-0100");
    let blob = build_search_text(&s, None);

    assert!(matches(&blob, "jo marsh"), "whitespace is collapsed");
    assert!(matches(&blob, "MARSH"));
    assert!(matches(&blob, "trash"));
    assert!(matches(&blob, ""), "empty query matches everything");
    assert!(matches(&blob, "   "));
}

#[test]
fn test_poc_email_matches_even_when_signup_fields_do_not() {
    let s = signup("Jo Marsh", "555-0100");
    let role = role_with_poc(r#"{"poc_contacts":[{"name":"Dana Reyes","email":"poc@example.org","phone":"(248) 555-0177"}]}"#);
    let blob = build_search_text(&s, Some(&role));

    assert!(matches(&blob, "poc@example.org"));
    assert!(matches(&blob, "dana"));
    assert!(matches(&blob, "248"), "poc phone digits are searchable too");
}

#[test]
fn test_legacy_poc_shapes_normalize() {
    let contacts = normalize_poc_contacts(
        r#"{"poc_contacts":[{"name":"Dana","email":"d@x.org"}],
            "poc_contact":{"name":"Sam","phone":"555-0101"},
            "suggested_poc":"Lee Wong"}"#,
    );
    assert_eq!(contacts.len(), 3);
    assert_eq!(contacts[0].name, "Dana");
    assert_eq!(contacts[0].email, "d@x.org");
    assert_eq!(contacts[1].name, "Sam");
    assert_eq!(contacts[1].phone, "555-0101");
    assert_eq!(contacts[2].name, "Lee Wong");

    let contacts = normalize_poc_contacts(r#"{"suggested_poc":["Ana","  ","Bo"]}"#);
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0].name, "Ana");
    assert_eq!(contacts[1].name, "Bo");
}

#[test]
fn test_malformed_poc_fragments_degrade_gracefully() {
    assert!(normalize_poc_contacts("not json at all").is_empty());
    assert!(normalize_poc_contacts("[1,2,3]").is_empty());
    assert!(normalize_poc_contacts(r#"{"poc_contacts":"oops"}"#).is_empty());

    // A malformed entry is skipped; well-formed neighbors survive.
    let contacts =
        normalize_poc_contacts(r#"{"poc_contacts":[42, {"name":"Dana"}, null]}"#);
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].name, "Dana");
}

#[test]
fn test_digits_only() {
    assert_eq!(digits_only("(313) 555-0100"), "3135550100");
    assert_eq!(digits_only("no digits"), "");
}

#[test]
fn test_status_facet_partitions_on_rule_one() {
    let mut arrived = signup("Ada", "555-0100");
    arrived.checked_in_at = Some("2026-09-12T09:00:00".to_string());

    let mut late = signup("Ben", "555-0101");
    late.check_in_notes = Some("Running late".to_string());

    let absent = signup("Cleo", "555-0102");

    for s in [&arrived, &late, &absent] {
        assert!(StatusFacet::All.matches(s));
    }
    assert!(StatusFacet::In.matches(&arrived));
    assert!(!StatusFacet::In.matches(&late));
    assert!(!StatusFacet::In.matches(&absent));

    // Running-late counts as not-in: only rule-1 rows are "in".
    assert!(StatusFacet::NotIn.matches(&late));
    assert!(StatusFacet::NotIn.matches(&absent));
    assert!(!StatusFacet::NotIn.matches(&arrived));

    assert_eq!(StatusFacet::parse("in"), StatusFacet::In);
    assert_eq!(StatusFacet::parse("not-in"), StatusFacet::NotIn);
    assert_eq!(StatusFacet::parse("anything"), StatusFacet::All);
}
