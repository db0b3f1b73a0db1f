pub mod cache;
pub mod hub;
pub mod search;
pub mod status;

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::signup::SignupRow;
use self::cache::{CheckinFields, PatchOutcome, RosterCache};

/// Shared registry of per-event roster caches.
///
/// Both mutation sources — the console write handlers and the rows bound for
/// the push channel — funnel through the same cache patch functions here, so
/// there is exactly one merge implementation.
#[derive(Default)]
pub struct RosterRegistry {
    inner: RwLock<HashMap<i64, RosterCache>>,
}

impl RosterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed (or wholesale replace) the cache for one event from a full fetch.
    pub fn seed(&self, event_id: i64, rows: Vec<SignupRow>) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.entry(event_id)
            .or_insert_with(|| RosterCache::new(event_id))
            .seed(rows);
    }

    pub fn is_seeded(&self, event_id: i64) -> bool {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.contains_key(&event_id)
    }

    /// Optimistic same-tick patch after a successful write.
    pub fn apply_local(
        &self,
        event_id: i64,
        signup_id: i64,
        fields: &CheckinFields,
    ) -> PatchOutcome {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match map.get_mut(&event_id) {
            Some(cache) => cache.apply_local_patch(signup_id, fields),
            None => PatchOutcome::Ignored,
        }
    }

    /// Merge an authoritative post-write row into the cache.
    pub fn apply_remote(&self, event_id: i64, row: &SignupRow) -> PatchOutcome {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match map.get_mut(&event_id) {
            Some(cache) => cache.apply_remote_patch(row),
            None => PatchOutcome::Ignored,
        }
    }

    pub fn snapshot(&self, event_id: i64) -> Option<Vec<SignupRow>> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        map.get(&event_id).map(|cache| cache.rows().to_vec())
    }

    /// Discard the cache for an event (last console subscriber gone, or the
    /// event was closed and the next console load will re-seed).
    pub fn drop_event(&self, event_id: i64) {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        map.remove(&event_id);
    }
}
