//! Visit aggregate and its parts.

use super::status::{TaskStatus, VisitStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Opaque visit identifier assigned by the server.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisitId(String);

/// Opaque task identifier assigned by the server.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl VisitId {
    /// Wrap a server-assigned visit id.
    ///
    /// # Example
    ///
    /// ```rust
    /// use caretrack::VisitId;
    ///
    /// let id = VisitId::new("visit-1");
    /// assert_eq!(id.as_str(), "visit-1");
    /// assert_eq!(id.to_string(), "visit-1");
    /// ```
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TaskId {
    /// Wrap a task id as sent by the server.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VisitId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A device location reading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub long: f64,
}

impl Coordinates {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// Finite and within the WGS84 latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.long.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.long)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SlotError {
    #[error("slot end {to} is not after its start {from}")]
    Inverted {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

#[derive(Deserialize)]
struct SlotFields {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

/// Scheduled time window of a visit. `to` is always strictly after `from`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlotFields")]
pub struct ScheduledSlot {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl TryFrom<SlotFields> for ScheduledSlot {
    type Error = SlotError;

    fn try_from(fields: SlotFields) -> Result<Self, Self::Error> {
        ScheduledSlot::new(fields.from, fields.to)
    }
}

impl ScheduledSlot {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, SlotError> {
        if to <= from {
            return Err(SlotError::Inverted { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    pub fn duration(&self) -> Duration {
        self.to - self.from
    }
}

/// A checklist item belonging to one visit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub feedback: Option<String>,
}

impl Task {
    /// A task that has not been done yet and carries no feedback.
    ///
    /// # Example
    ///
    /// ```rust
    /// use caretrack::{Task, TaskStatus};
    ///
    /// let task = Task::pending("t1", "Medication", "Morning dose");
    /// assert_eq!(task.status, TaskStatus::Pending);
    /// assert!(task.feedback.is_none());
    /// ```
    pub fn pending(id: impl Into<TaskId>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            feedback: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

impl From<String> for TaskId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<String> for VisitId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Completed vs total task count, for visit-level reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub completed: usize,
    pub total: usize,
}

impl TaskProgress {
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

/// One scheduled service appointment.
///
/// `status` is the single source of truth for everything derived from a
/// visit. The engine never creates visits; they are loaded from the remote
/// store and replaced wholesale by its confirmed responses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub status: VisitStatus,
    pub scheduled_slot: ScheduledSlot,
    pub checkin_time: Option<DateTime<Utc>>,
    pub checkin_location: Option<Coordinates>,
    pub checkout_time: Option<DateTime<Utc>>,
    pub checkout_location: Option<Coordinates>,
    pub tasks: Vec<Task>,
    pub service_note: Option<String>,
    pub service_name: String,
    pub client_name: String,
}

impl Visit {
    /// An upcoming visit with no tasks, as the server first hands it out.
    pub fn scheduled(id: impl Into<VisitId>, slot: ScheduledSlot) -> Self {
        Self {
            id: id.into(),
            status: VisitStatus::Upcoming,
            scheduled_slot: slot,
            checkin_time: None,
            checkin_location: None,
            checkout_time: None,
            checkout_location: None,
            tasks: Vec::new(),
            service_note: None,
            service_name: String::new(),
            client_name: String::new(),
        }
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    /// Copy of this visit with `task` substituted for the task of the same id.
    ///
    /// Returns `None` when no task carries that id; order is preserved.
    pub fn with_task_replaced(&self, task: Task) -> Option<Visit> {
        let position = self.tasks.iter().position(|t| t.id == task.id)?;
        let mut next = self.clone();
        next.tasks[position] = task;
        Some(next)
    }

    pub fn task_progress(&self) -> TaskProgress {
        TaskProgress {
            completed: self.tasks.iter().filter(|t| t.is_completed()).count(),
            total: self.tasks.len(),
        }
    }

    pub fn is_checked_in(&self) -> bool {
        self.checkin_time.is_some()
    }
}
