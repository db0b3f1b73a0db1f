use serde::Serialize;

use crate::models::signup::SignupRow;

/// Marker substring sniffed out of the free-text notes field. This function
/// is the only reader of the convention; the annotate procedure is the only
/// writer.
const RUNNING_LATE_MARKER: &str = "running late";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckinStatus {
    CheckedIn,
    RunningLate,
    NotCheckedIn,
}

/// Displayable status for one signup: machine status plus the badge text and
/// style variant the console renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub status: CheckinStatus,
    pub label: &'static str,
    pub variant: &'static str,
}

/// Map a signup to its display status. Total — every row lands in exactly
/// one of the three states. Priority order, first match wins:
///
/// 1. arrived and not departed → checked-in
/// 2. not arrived, notes carry the running-late marker → running-late
/// 3. everything else → not-checked-in
///
/// There is deliberately no fourth checked-out state: a departed volunteer
/// falls through to not-checked-in, which keeps the checked-in count equal
/// to the rule-1 population.
pub fn derive_status(signup: &SignupRow) -> StatusBadge {
    if signup.checked_in_at.is_some() && signup.checked_out_at.is_none() {
        return StatusBadge {
            status: CheckinStatus::CheckedIn,
            label: "Checked in",
            variant: "success",
        };
    }

    if signup.checked_in_at.is_none() {
        let running_late = signup
            .check_in_notes
            .as_deref()
            .map(|notes| notes.trim().to_lowercase().contains(RUNNING_LATE_MARKER))
            .unwrap_or(false);
        if running_late {
            return StatusBadge {
                status: CheckinStatus::RunningLate,
                label: "Running late",
                variant: "warning",
            };
        }
    }

    StatusBadge {
        status: CheckinStatus::NotCheckedIn,
        label: "Not checked in",
        variant: "muted",
    }
}
