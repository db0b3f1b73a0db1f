use crate::models::signup::SignupRow;
use crate::roster::status::{CheckinStatus, derive_status};

/// The three fields every check-in mutation is allowed to touch. Patches
/// replace all three wholesale — last writer wins, no field-level merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinFields {
    pub checked_in_at: Option<String>,
    pub checked_out_at: Option<String>,
    pub check_in_notes: Option<String>,
}

impl CheckinFields {
    pub fn of(row: &SignupRow) -> Self {
        Self {
            checked_in_at: row.checked_in_at.clone(),
            checked_out_at: row.checked_out_at.clone(),
            check_in_notes: row.check_in_notes.clone(),
        }
    }

    fn write_to(&self, row: &mut SignupRow) {
        row.checked_in_at = self.checked_in_at.clone();
        row.checked_out_at = self.checked_out_at.clone();
        row.check_in_notes = self.check_in_notes.clone();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The row was found and at least one check-in field changed.
    Applied,
    /// The row was found but all three fields already match — typically the
    /// push channel echoing a write this cache already holds. Callers skip
    /// the broadcast/re-render for this outcome.
    Unchanged,
    /// No row with that id. New signups arrive via the seed/reload path,
    /// never via a patch, so an unknown id is dropped rather than inserted —
    /// a patch row carries stale name/role fields and must not become a
    /// phantom roster entry.
    Ignored,
}

/// Display-authoritative ordered roster for one event.
///
/// Seeded once from a full fetch, then patched in place — never replaced
/// wholesale on a patch, so unrelated rows (and any in-flight edits to them)
/// are untouched.
#[derive(Debug)]
pub struct RosterCache {
    event_id: i64,
    rows: Vec<SignupRow>,
}

impl RosterCache {
    pub fn new(event_id: i64) -> Self {
        Self {
            event_id,
            rows: Vec::new(),
        }
    }

    pub fn event_id(&self) -> i64 {
        self.event_id
    }

    /// Replace the entire cache from an initial or reload fetch.
    pub fn seed(&mut self, rows: Vec<SignupRow>) {
        self.rows = rows;
    }

    pub fn rows(&self) -> &[SignupRow] {
        &self.rows
    }

    pub fn get(&self, id: i64) -> Option<&SignupRow> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows currently in the checked-in display state.
    pub fn checked_in_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| derive_status(r).status == CheckinStatus::CheckedIn)
            .count()
    }

    /// Merge an authoritative row delivered by the store (post-write re-read
    /// or push event). Only the three check-in fields are compared and
    /// copied; identity fields in the patch are ignored.
    pub fn apply_remote_patch(&mut self, updated: &SignupRow) -> PatchOutcome {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == updated.id) else {
            return PatchOutcome::Ignored;
        };
        let incoming = CheckinFields::of(updated);
        if incoming == CheckinFields::of(row) {
            return PatchOutcome::Unchanged;
        }
        incoming.write_to(row);
        PatchOutcome::Applied
    }

    /// Optimistic same-tick patch after a successful write, independent of
    /// whether the authoritative row has arrived yet. Last writer wins.
    pub fn apply_local_patch(&mut self, id: i64, fields: &CheckinFields) -> PatchOutcome {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == id) else {
            return PatchOutcome::Ignored;
        };
        if *fields == CheckinFields::of(row) {
            return PatchOutcome::Unchanged;
        }
        fields.write_to(row);
        PatchOutcome::Applied
    }
}
