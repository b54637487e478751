//! Actions that can be requested against a visit.

use super::model::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of guarded action, independent of its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CheckIn,
    CheckOut,
    Cancel,
    UpdateTask,
    SaveNote,
    Refresh,
}

impl ActionKind {
    /// Identifier used in logs and transition records.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::CheckIn => "check_in",
            ActionKind::CheckOut => "check_out",
            ActionKind::Cancel => "cancel",
            ActionKind::UpdateTask => "update_task",
            ActionKind::SaveNote => "save_note",
            ActionKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::CheckIn => "check in",
            ActionKind::CheckOut => "check out",
            ActionKind::Cancel => "cancel",
            ActionKind::UpdateTask => "update task",
            ActionKind::SaveNote => "save note",
            ActionKind::Refresh => "refresh",
        })
    }
}

/// A visit-level transition request with its payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VisitAction {
    CheckIn(Coordinates),
    CheckOut(Coordinates),
    Cancel,
}

impl VisitAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            VisitAction::CheckIn(_) => ActionKind::CheckIn,
            VisitAction::CheckOut(_) => ActionKind::CheckOut,
            VisitAction::Cancel => ActionKind::Cancel,
        }
    }
}
