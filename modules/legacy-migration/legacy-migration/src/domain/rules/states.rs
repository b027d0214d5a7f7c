//! Legacy enumerations collapsed into destination state codes.

use tracing::warn;

pub const STATE_INACTIVE: i64 = 0;
pub const STATE_ACTIVE: i64 = 1;

/// Legacy rows carry an "archived" flag; the destination an active state.
#[must_use]
pub fn record_state(is_archived: bool) -> i64 {
    if is_archived { STATE_INACTIVE } else { STATE_ACTIVE }
}

/// Work-order lifecycle codes in the destination schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOrderState {
    New = 1,
    Declined = 2,
    Pending = 3,
    Cancelled = 4,
    Ongoing = 5,
    InProgress = 6,
    CompletedButUnpaid = 7,
    CompletedAndPaid = 8,
    Archived = 9,
    Terminated = 10,
}

impl WorkOrderState {
    /// Fallback for legacy values outside the known set.
    pub const DEFAULT: Self = Self::Pending;

    /// Map a legacy status string. Unknown values fall back to
    /// [`DEFAULT`](Self::DEFAULT); legacy data is known to be inconsistent.
    #[must_use]
    pub fn from_legacy(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::DEFAULT;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Self::New,
            "declined" => Self::Declined,
            "pending" => Self::Pending,
            "cancelled" | "canceled" => Self::Cancelled,
            "ongoing" => Self::Ongoing,
            "in_progress" => Self::InProgress,
            "completed_but_unpaid" | "completed_and_unpaid" => Self::CompletedButUnpaid,
            "completed_and_paid" => Self::CompletedAndPaid,
            "archived" => Self::Archived,
            "terminated" => Self::Terminated,
            other => {
                warn!(state = other, fallback = ?Self::DEFAULT, "unrecognised work order state");
                Self::DEFAULT
            }
        }
    }

    #[must_use]
    pub fn code(self) -> i64 {
        self as i64
    }
}

pub const ONGOING_RUNNING: i64 = 1;
pub const ONGOING_TERMINATED: i64 = 2;

/// Ongoing work orders are either running or terminated.
#[must_use]
pub fn ongoing_state(value: Option<&str>) -> i64 {
    match value.map(str::trim) {
        Some(s) if s.eq_ignore_ascii_case("terminated") => ONGOING_TERMINATED,
        _ => ONGOING_RUNNING,
    }
}

pub const ACTIVITY_DECLINED: i64 = 1;
pub const ACTIVITY_PENDING: i64 = 2;
pub const ACTIVITY_ACCEPTED: i64 = 3;

/// An associate's answer to a job offer; anything unrecognised is a decline.
#[must_use]
pub fn activity_sheet_state(value: Option<&str>) -> i64 {
    match value.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        Some("pending") => ACTIVITY_PENDING,
        Some("accepted") => ACTIVITY_ACCEPTED,
        _ => ACTIVITY_DECLINED,
    }
}
