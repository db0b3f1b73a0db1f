//! Push channel tests — per-event delivery, the reload signal, and
//! subscriber pruning.

use tokio::sync::mpsc;

use muster::models::signup::SignupRow;
use muster::roster::hub;

fn row(event_id: i64) -> SignupRow {
    SignupRow {
        id: 1,
        event_id,
        role_id: 1,
        role_label: "Trash pickup".to_string(),
        name: "Jo Marsh".to_string(),
        phone: "555-0100".to_string(),
        checked_in_at: Some("2026-09-12T09:00:00".to_string()),
        checked_out_at: None,
        check_in_notes: None,
    }
}

#[actix_rt::test]
async fn test_broadcast_reaches_only_the_rows_event() {
    let h = hub::new_hub();
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    hub::subscribe(&h, 7, tx_a);
    hub::subscribe(&h, 8, tx_b);

    hub::broadcast_row(&h, &row(7));

    let msg = rx_a.recv().await.expect("subscriber for event 7 gets the row");
    let parsed: serde_json::Value = serde_json::from_str(&msg).expect("valid JSON");
    assert_eq!(parsed["type"], "signup_update");
    assert_eq!(parsed["signup"]["id"], 1);
    assert_eq!(parsed["badge"]["status"], "checked-in");

    assert!(rx_b.try_recv().is_err(), "event 8 subscriber hears nothing");
}

#[actix_rt::test]
async fn test_reload_signal() {
    let h = hub::new_hub();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub::subscribe(&h, 7, tx);

    hub::broadcast_reload(&h, 7);

    let msg = rx.recv().await.expect("reload delivered");
    let parsed: serde_json::Value = serde_json::from_str(&msg).expect("valid JSON");
    assert_eq!(parsed["type"], "roster_reload");
}

#[actix_rt::test]
async fn test_prune_reports_when_last_subscriber_leaves() {
    let h = hub::new_hub();
    let (tx_a, rx_a) = mpsc::unbounded_channel();
    let (tx_b, rx_b) = mpsc::unbounded_channel();
    hub::subscribe(&h, 7, tx_a);
    hub::subscribe(&h, 7, tx_b);

    drop(rx_a);
    assert!(!hub::prune(&h, 7), "one live subscriber remains");

    drop(rx_b);
    assert!(hub::prune(&h, 7), "last subscriber gone");

    // Unknown event id counts as already empty
    assert!(hub::prune(&h, 99));
}
