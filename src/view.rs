//! Derived view state.
//!
//! Every rendering surface asks [`project_view`] what to show instead of
//! branching on the status itself. The projection is pure and reads only the
//! status (plus `checkin_time` for cancel-ability).

use crate::core::State;
use crate::visit::{machine, ActionKind, Visit, VisitStatus};
use serde::{Deserialize, Serialize};

/// Colour family of the status badge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTone {
    Neutral,
    Warning,
    Success,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBadge {
    pub label: String,
    pub tone: BadgeTone,
}

/// A button the UI may render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
    /// `None` for informational buttons that trigger nothing.
    pub action: Option<ActionKind>,
    pub label: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitView {
    pub status_badge: StatusBadge,
    pub primary_action: Option<ActionButton>,
    pub secondary_actions: Vec<ActionButton>,
    pub tasks_editable: bool,
}

impl VisitView {
    /// Enabled button for `action`, if the view offers one.
    pub fn offers(&self, action: ActionKind) -> bool {
        self.primary_action
            .iter()
            .chain(self.secondary_actions.iter())
            .any(|b| b.action == Some(action) && b.enabled)
    }
}

fn badge(status: VisitStatus) -> StatusBadge {
    let (label, tone) = match status {
        VisitStatus::Upcoming => ("Scheduled", BadgeTone::Neutral),
        VisitStatus::InProgress => ("In progress", BadgeTone::Warning),
        VisitStatus::Completed => ("Completed", BadgeTone::Success),
        VisitStatus::Cancelled => ("Cancelled", BadgeTone::Danger),
    };
    StatusBadge {
        label: label.to_string(),
        tone,
    }
}

fn idle_label(action: ActionKind) -> &'static str {
    match action {
        ActionKind::CheckIn => "Clock-In Now",
        ActionKind::CheckOut => "Clock-Out Now",
        ActionKind::Cancel => "Cancel Schedule",
        ActionKind::UpdateTask => "Update Task",
        ActionKind::SaveNote => "Save Notes",
        ActionKind::Refresh => "Refresh",
    }
}

fn busy_label(action: ActionKind) -> &'static str {
    match action {
        ActionKind::CheckIn => "Checking In...",
        ActionKind::CheckOut => "Checking Out...",
        ActionKind::Cancel => "Cancelling...",
        ActionKind::UpdateTask => "Updating...",
        ActionKind::SaveNote => "Saving...",
        ActionKind::Refresh => "Refreshing...",
    }
}

fn button(visit: &Visit, action: ActionKind, pending: Option<ActionKind>) -> ActionButton {
    let label = if pending == Some(action) {
        busy_label(action)
    } else {
        idle_label(action)
    };
    let allowed = match action {
        ActionKind::CheckIn | ActionKind::CheckOut | ActionKind::Cancel => {
            machine::can_apply(visit, action)
        }
        _ => true,
    };
    ActionButton {
        action: Some(action),
        label: label.to_string(),
        enabled: allowed && pending.is_none(),
    }
}

/// View state for a visit with nothing in flight.
pub fn project_view(visit: &Visit) -> VisitView {
    project_view_pending(visit, None)
}

/// View state while `pending` is running: everything is disabled and the
/// running action shows its progress label.
pub fn project_view_pending(visit: &Visit, pending: Option<ActionKind>) -> VisitView {
    let primary_action = match visit.status {
        VisitStatus::Upcoming => Some(button(visit, ActionKind::CheckIn, pending)),
        VisitStatus::InProgress => Some(button(visit, ActionKind::CheckOut, pending)),
        VisitStatus::Completed => None,
        VisitStatus::Cancelled => Some(ActionButton {
            action: None,
            label: "Schedule Cancelled".to_string(),
            enabled: false,
        }),
    };

    let mut secondary_actions = Vec::new();
    if visit.status == VisitStatus::Upcoming && visit.checkin_time.is_none() {
        secondary_actions.push(button(visit, ActionKind::Cancel, pending));
    }
    secondary_actions.push(button(visit, ActionKind::SaveNote, pending));

    VisitView {
        status_badge: badge(visit.status),
        primary_action,
        secondary_actions,
        tasks_editable: !visit.status.is_final() && pending.is_none(),
    }
}
