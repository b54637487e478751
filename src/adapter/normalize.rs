//! The one table mapping wire status spellings to canonical statuses.
//!
//! Matching ignores case and surrounding whitespace, and treats `-` and
//! spaces like `_`.

use crate::visit::{TaskStatus, VisitStatus};

fn canonical(raw: &str) -> String {
    raw.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

pub fn parse_visit_status(raw: &str) -> Option<VisitStatus> {
    match canonical(raw).as_str() {
        "upcoming" | "scheduled" => Some(VisitStatus::Upcoming),
        "in_progress" => Some(VisitStatus::InProgress),
        "completed" => Some(VisitStatus::Completed),
        "cancelled" | "canceled" | "missed" => Some(VisitStatus::Cancelled),
        _ => None,
    }
}

pub fn parse_task_status(raw: &str) -> Option<TaskStatus> {
    match canonical(raw).as_str() {
        "pending" | "not_completed" => Some(TaskStatus::Pending),
        "completed" => Some(TaskStatus::Completed),
        _ => None,
    }
}

pub fn visit_status_to_wire(status: VisitStatus) -> &'static str {
    match status {
        VisitStatus::Upcoming => "upcoming",
        VisitStatus::InProgress => "in_progress",
        VisitStatus::Completed => "completed",
        VisitStatus::Cancelled => "cancelled",
    }
}

pub fn task_status_to_wire(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Completed => "completed",
    }
}
