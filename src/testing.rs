//! In-memory collaborators for tests and demos.
//!
//! [`ScriptedLocation`] returns a fixed reading (or error) after an optional
//! delay. [`InMemoryVisitStore`] behaves like a well-behaved server: it runs
//! the same machines on its own copy of each visit, records every call and
//! can be told to fail or to answer with a canned representation.

use crate::collaborators::{
    LocationError, LocationProvider, RemoteError, RemoteVisitStore, Submission, TaskUpdate,
};
use crate::visit::{machine, task, Coordinates, Task, TaskId, Visit, VisitId};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Location provider with a scripted outcome.
#[derive(Debug)]
pub struct ScriptedLocation {
    outcome: Result<Coordinates, LocationError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedLocation {
    pub fn at(lat: f64, long: f64) -> Self {
        Self {
            outcome: Ok(Coordinates::new(lat, long)),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: LocationError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of readings requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for ScriptedLocation {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome
    }
}

/// A call received by [`InMemoryVisitStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Fetch(VisitId),
    CheckIn(VisitId, Submission),
    CheckOut(VisitId, Submission),
    Cancel(VisitId),
    TaskUpdate(VisitId, TaskId, TaskUpdate),
    ServiceNote(VisitId, String),
}

/// Server stand-in holding visits in memory.
#[derive(Debug, Default)]
pub struct InMemoryVisitStore {
    visits: Mutex<HashMap<VisitId, Visit>>,
    calls: Mutex<Vec<StoreCall>>,
    failures: Mutex<VecDeque<RemoteError>>,
    canned: Mutex<VecDeque<Visit>>,
    canned_tasks: Mutex<VecDeque<Task>>,
    delay: Option<Duration>,
}

impl InMemoryVisitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_visit(self, visit: Visit) -> Self {
        lock(&self.visits).insert(visit.id.clone(), visit);
        self
    }

    /// Wait `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make the next call fail with `error`. Queued failures are consumed in order.
    pub fn fail_next(&self, error: RemoteError) {
        lock(&self.failures).push_back(error);
    }

    /// Answer the next visit-returning call with `visit` instead of the
    /// computed result. The stored copy is replaced too.
    pub fn respond_next_with(&self, visit: Visit) {
        lock(&self.canned).push_back(visit);
    }

    /// Answer the next task update with `task` instead of the updated task.
    /// The stored visit is left alone.
    pub fn respond_next_task_with(&self, task: Task) {
        lock(&self.canned_tasks).push_back(task);
    }

    pub fn visit(&self, id: &VisitId) -> Option<Visit> {
        lock(&self.visits).get(id).cloned()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    async fn begin(&self, call: StoreCall) -> Result<(), RemoteError> {
        lock(&self.calls).push(call);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match lock(&self.failures).pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn load(&self, id: &VisitId) -> Result<Visit, RemoteError> {
        lock(&self.visits)
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::Rejected {
                status: 404,
                message: format!("visit '{id}' not found"),
            })
    }

    fn commit(&self, visit: Visit) -> Visit {
        let visit = lock(&self.canned).pop_front().unwrap_or(visit);
        lock(&self.visits).insert(visit.id.clone(), visit.clone());
        visit
    }

    fn conflict(error: impl ToString) -> RemoteError {
        RemoteError::Rejected {
            status: 409,
            message: error.to_string(),
        }
    }
}

#[async_trait]
impl RemoteVisitStore for InMemoryVisitStore {
    async fn fetch_visit(&self, visit_id: &VisitId) -> Result<Visit, RemoteError> {
        self.begin(StoreCall::Fetch(visit_id.clone())).await?;
        let visit = self.load(visit_id)?;
        Ok(self.commit(visit))
    }

    async fn submit_check_in(
        &self,
        visit_id: &VisitId,
        submission: Submission,
    ) -> Result<Visit, RemoteError> {
        self.begin(StoreCall::CheckIn(visit_id.clone(), submission))
            .await?;
        let current = self.load(visit_id)?;
        let next = machine::check_in(&current, submission.location, submission.timestamp)
            .map_err(Self::conflict)?;
        Ok(self.commit(next))
    }

    async fn submit_check_out(
        &self,
        visit_id: &VisitId,
        submission: Submission,
    ) -> Result<Visit, RemoteError> {
        self.begin(StoreCall::CheckOut(visit_id.clone(), submission))
            .await?;
        let current = self.load(visit_id)?;
        let next = machine::check_out(&current, submission.location, submission.timestamp)
            .map_err(Self::conflict)?;
        Ok(self.commit(next))
    }

    async fn submit_cancel(&self, visit_id: &VisitId) -> Result<Visit, RemoteError> {
        self.begin(StoreCall::Cancel(visit_id.clone())).await?;
        let current = self.load(visit_id)?;
        let next = machine::cancel(&current, chrono::Utc::now()).map_err(Self::conflict)?;
        Ok(self.commit(next))
    }

    async fn submit_task_update(
        &self,
        visit_id: &VisitId,
        task_id: &TaskId,
        update: TaskUpdate,
    ) -> Result<Task, RemoteError> {
        self.begin(StoreCall::TaskUpdate(
            visit_id.clone(),
            task_id.clone(),
            update.clone(),
        ))
        .await?;
        if let Some(task) = lock(&self.canned_tasks).pop_front() {
            return Ok(task);
        }
        let current = self.load(visit_id)?;
        let existing = current.task(task_id).ok_or_else(|| RemoteError::Rejected {
            status: 404,
            message: format!("task '{task_id}' not found"),
        })?;
        let updated =
            task::apply_status(existing, update.status, update.feedback).map_err(Self::conflict)?;
        if let Some(next) = current.with_task_replaced(updated.clone()) {
            lock(&self.visits).insert(next.id.clone(), next);
        }
        Ok(updated)
    }

    async fn submit_service_note(
        &self,
        visit_id: &VisitId,
        note: &str,
    ) -> Result<String, RemoteError> {
        self.begin(StoreCall::ServiceNote(visit_id.clone(), note.to_string()))
            .await?;
        let mut current = self.load(visit_id)?;
        current.service_note = Some(note.to_string());
        lock(&self.visits).insert(current.id.clone(), current);
        Ok(note.to_string())
    }
}
