use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

use crate::models::signup::SignupRow;
use crate::roster::status::derive_status;

/// Push channel registry: console subscribers keyed by event id. The roster
/// console holds one subscription per open event view; senders are pruned on
/// disconnect so a dropped console never leaks its callback.
pub type RosterHub = Arc<RwLock<HashMap<i64, Vec<mpsc::UnboundedSender<String>>>>>;

pub fn new_hub() -> RosterHub {
    Arc::new(RwLock::new(HashMap::new()))
}

/// Register a console subscription for one event.
pub fn subscribe(hub: &RosterHub, event_id: i64, tx: mpsc::UnboundedSender<String>) {
    let mut map = hub.write().unwrap_or_else(|e| e.into_inner());
    map.entry(event_id).or_default().push(tx);
}

/// Drop closed senders for an event. Returns true when no subscribers
/// remain, so the caller can discard the event's roster cache as well.
pub fn prune(hub: &RosterHub, event_id: i64) -> bool {
    let mut map = hub.write().unwrap_or_else(|e| e.into_inner());
    if let Some(senders) = map.get_mut(&event_id) {
        senders.retain(|s| !s.is_closed());
        if senders.is_empty() {
            map.remove(&event_id);
            return true;
        }
        return false;
    }
    true
}

fn send_to_event(hub: &RosterHub, event_id: i64, msg: String) {
    let map = match hub.read() {
        Ok(m) => m,
        Err(_) => return,
    };
    if let Some(senders) = map.get(&event_id) {
        for sender in senders {
            let _ = sender.send(msg.clone());
        }
    }
}

/// Broadcast the authoritative post-write row, with its derived badge, to
/// every console watching the row's event.
pub fn broadcast_row(hub: &RosterHub, row: &SignupRow) {
    let msg = serde_json::json!({
        "type": "signup_update",
        "signup": row,
        "badge": derive_status(row),
    });
    send_to_event(hub, row.event_id, msg.to_string());
}

/// Tell consoles to re-fetch the whole roster (after a close-event batch the
/// row set itself changed, not just fields).
pub fn broadcast_reload(hub: &RosterHub, event_id: i64) {
    let msg = serde_json::json!({ "type": "roster_reload" });
    send_to_event(hub, event_id, msg.to_string());
}
