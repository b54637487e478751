//! Canonical visit and task statuses.
//!
//! These are the only status representations used inside the engine.
//! Wire spellings ("scheduled", "canceled", "missed", ...) are mapped onto
//! them in [`adapter`](crate::adapter) and nowhere else.

use std::fmt;

crate::state_enum! {
    /// Lifecycle status of a visit.
    #[serde(rename_all = "snake_case")]
    pub enum VisitStatus {
        Upcoming,
        InProgress,
        Completed,
        Cancelled,
    }
    final: [Completed, Cancelled]
}

crate::state_enum! {
    /// Status of a checklist task.
    #[serde(rename_all = "snake_case")]
    pub enum TaskStatus {
        Pending,
        Completed,
    }
    final: [Completed]
}

impl VisitStatus {
    pub const ALL: [VisitStatus; 4] = [
        VisitStatus::Upcoming,
        VisitStatus::InProgress,
        VisitStatus::Completed,
        VisitStatus::Cancelled,
    ];

    /// Check-in has happened in this status.
    pub fn is_checked_in(self) -> bool {
        matches!(self, VisitStatus::InProgress | VisitStatus::Completed)
    }
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 2] = [TaskStatus::Pending, TaskStatus::Completed];
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VisitStatus::Upcoming => "upcoming",
            VisitStatus::InProgress => "in progress",
            VisitStatus::Completed => "completed",
            VisitStatus::Cancelled => "cancelled",
        })
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        })
    }
}
