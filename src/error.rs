//! Error taxonomy of the lifecycle engine.

use crate::collaborators::{LocationError, RemoteError};
use crate::visit::{ActionKind, TaskId, VisitId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What an invalid transition was attempted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Visit,
    Task,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Subject::Visit => "visit",
            Subject::Task => "task",
        })
    }
}

/// Failure of a transition or guarded action.
///
/// The machines return these instead of panicking; the orchestrator adds the
/// collaborator failures. Whatever the variant, the visit is left exactly as
/// it was before the action started.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LifecycleError {
    #[error("cannot {action}: {subject} is {from}")]
    InvalidTransition {
        subject: Subject,
        action: ActionKind,
        from: String,
    },

    #[error("task '{0}' does not belong to this visit")]
    UnknownTask(TaskId),

    #[error("location unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),

    #[error("remote store rejected the request: {0}")]
    RemoteRejected(#[from] RemoteError),

    #[error("cannot {requested} visit '{visit_id}' while {pending} is in progress")]
    ActionInProgress {
        visit_id: VisitId,
        requested: ActionKind,
        pending: ActionKind,
    },
}

/// Coarse classification of [`LifecycleError`] for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Stale action against the wrong status; re-read and carry on.
    InvalidTransition,
    /// Device or permission problem; the user has to act.
    LocationUnavailable,
    /// Server or network problem; the same action may be retried.
    RemoteRejected,
    /// Another action on the same visit is still running.
    ActionInProgress,
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::InvalidTransition { .. } | LifecycleError::UnknownTask(_) => {
                ErrorKind::InvalidTransition
            }
            LifecycleError::LocationUnavailable(_) => ErrorKind::LocationUnavailable,
            LifecycleError::RemoteRejected(_) => ErrorKind::RemoteRejected,
            LifecycleError::ActionInProgress { .. } => ErrorKind::ActionInProgress,
        }
    }

    /// Safe to run the same action again without re-reading the visit.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RemoteRejected | ErrorKind::ActionInProgress
        )
    }

    pub(crate) fn invalid_visit(action: ActionKind, from: impl fmt::Display) -> Self {
        LifecycleError::InvalidTransition {
            subject: Subject::Visit,
            action,
            from: from.to_string(),
        }
    }

    pub(crate) fn invalid_task(from: impl fmt::Display) -> Self {
        LifecycleError::InvalidTransition {
            subject: Subject::Task,
            action: ActionKind::UpdateTask,
            from: from.to_string(),
        }
    }
}
