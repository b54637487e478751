//! Invariant violations found on a visit representation.

use crate::visit::{TaskId, VisitStatus};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum VisitViolation {
    #[error("check-in time must be present exactly when status is in progress or completed (status: {status})")]
    CheckinTimeMismatch { status: VisitStatus },

    #[error("check-out time must be present exactly when status is completed (status: {status})")]
    CheckoutTimeMismatch { status: VisitStatus },

    #[error("check-in location and time must be set together")]
    CheckinLocationMismatch,

    #[error("check-out location and time must be set together")]
    CheckoutLocationMismatch,

    #[error("check-out happened before check-in")]
    CheckoutBeforeCheckin,

    #[error("recorded location is out of range")]
    LocationOutOfRange,

    #[error("task '{0}' has feedback but is not completed")]
    FeedbackOnPendingTask(TaskId),

    #[error("task id '{0}' appears more than once")]
    DuplicateTask(TaskId),

    #[error("expected visit '{expected}', got '{found}'")]
    WrongVisit { expected: String, found: String },
}
