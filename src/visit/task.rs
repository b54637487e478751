//! Task sub-state machine: `Pending -> Completed`, nothing else.
//!
//! Task transitions ignore the parent visit's status. Whether editing is
//! offered at all is decided by the view projection.

use super::model::Task;
use super::status::TaskStatus;
use crate::core::State;
use crate::error::LifecycleError;

/// Trim feedback and drop it when nothing is left.
pub fn normalize_feedback(feedback: Option<String>) -> Option<String> {
    feedback
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Mark a pending task completed, attaching optional feedback.
pub fn complete(task: &Task, feedback: Option<String>) -> Result<Task, LifecycleError> {
    if task.status.is_final() {
        return Err(LifecycleError::invalid_task(task.status));
    }
    Ok(Task {
        status: TaskStatus::Completed,
        feedback: normalize_feedback(feedback),
        ..task.clone()
    })
}

/// Move a task to `status`. Re-opening (`Pending`) is never legal.
pub fn apply_status(
    task: &Task,
    status: TaskStatus,
    feedback: Option<String>,
) -> Result<Task, LifecycleError> {
    match status {
        TaskStatus::Completed => complete(task, feedback),
        TaskStatus::Pending => Err(LifecycleError::invalid_task(task.status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn pending() -> Task {
        Task::pending("t1", "Lunch", "Prepare and serve lunch")
    }

    #[test]
    fn complete_sets_status_and_feedback() {
        let done = complete(&pending(), Some("looks good".to_string())).unwrap();

        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.feedback.as_deref(), Some("looks good"));
        assert_eq!(done.title, "Lunch");
    }

    #[test]
    fn second_completion_is_rejected_and_changes_nothing() {
        let done = complete(&pending(), Some("looks good".to_string())).unwrap();
        let err = complete(&done, Some("again".to_string())).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(done.feedback.as_deref(), Some("looks good"));
    }

    #[test]
    fn blank_feedback_is_dropped() {
        let done = complete(&pending(), Some("   ".to_string())).unwrap();
        assert!(done.feedback.is_none());

        let done = complete(&pending(), Some("  ate well \n".to_string())).unwrap();
        assert_eq!(done.feedback.as_deref(), Some("ate well"));
    }

    #[test]
    fn reopening_is_never_allowed() {
        assert!(apply_status(&pending(), TaskStatus::Pending, None).is_err());

        let done = complete(&pending(), None).unwrap();
        assert!(apply_status(&done, TaskStatus::Pending, None).is_err());
    }
}
