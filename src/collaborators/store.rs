//! Remote visit store collaborator.
//!
//! The store is the authority on visit state. Every method either returns
//! the server's confirmed representation or a [`RemoteError`] that the engine
//! surfaces verbatim.

use crate::visit::{Coordinates, Task, TaskId, TaskStatus, Visit, VisitId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by the remote store.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Timestamped location sent with check-in and check-out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub timestamp: DateTime<Utc>,
    pub location: Coordinates,
}

/// Requested task change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub status: TaskStatus,
    pub feedback: Option<String>,
}

#[async_trait]
pub trait RemoteVisitStore: Send + Sync {
    /// Load the current representation of a visit.
    async fn fetch_visit(&self, visit_id: &VisitId) -> Result<Visit, RemoteError>;

    async fn submit_check_in(
        &self,
        visit_id: &VisitId,
        submission: Submission,
    ) -> Result<Visit, RemoteError>;

    async fn submit_check_out(
        &self,
        visit_id: &VisitId,
        submission: Submission,
    ) -> Result<Visit, RemoteError>;

    async fn submit_cancel(&self, visit_id: &VisitId) -> Result<Visit, RemoteError>;

    /// Persist a task change; returns the confirmed task.
    async fn submit_task_update(
        &self,
        visit_id: &VisitId,
        task_id: &TaskId,
        update: TaskUpdate,
    ) -> Result<Task, RemoteError>;

    /// Persist the service note; returns the stored note text.
    async fn submit_service_note(
        &self,
        visit_id: &VisitId,
        note: &str,
    ) -> Result<String, RemoteError>;
}

#[async_trait]
impl<S: RemoteVisitStore + ?Sized> RemoteVisitStore for std::sync::Arc<S> {
    async fn fetch_visit(&self, visit_id: &VisitId) -> Result<Visit, RemoteError> {
        (**self).fetch_visit(visit_id).await
    }

    async fn submit_check_in(
        &self,
        visit_id: &VisitId,
        submission: Submission,
    ) -> Result<Visit, RemoteError> {
        (**self).submit_check_in(visit_id, submission).await
    }

    async fn submit_check_out(
        &self,
        visit_id: &VisitId,
        submission: Submission,
    ) -> Result<Visit, RemoteError> {
        (**self).submit_check_out(visit_id, submission).await
    }

    async fn submit_cancel(&self, visit_id: &VisitId) -> Result<Visit, RemoteError> {
        (**self).submit_cancel(visit_id).await
    }

    async fn submit_task_update(
        &self,
        visit_id: &VisitId,
        task_id: &TaskId,
        update: TaskUpdate,
    ) -> Result<Task, RemoteError> {
        (**self).submit_task_update(visit_id, task_id, update).await
    }

    async fn submit_service_note(
        &self,
        visit_id: &VisitId,
        note: &str,
    ) -> Result<String, RemoteError> {
        (**self).submit_service_note(visit_id, note).await
    }
}
