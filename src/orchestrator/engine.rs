//! Guarded actions.
//!
//! Every action follows the same shape: claim the visit's in-flight slot,
//! gather inputs (location for clock-in/out), run the local machine, submit
//! to the remote store, validate the answer and only then replace the
//! tracked visit. Any failure returns before the last step, so the tracked
//! visit never holds an unconfirmed state.

use super::tracked::TrackedVisit;
use crate::collaborators::{
    acquire_location, LocationProvider, RemoteError, RemoteVisitStore, Submission, TaskUpdate,
};
use crate::config::EngineConfig;
use crate::error::LifecycleError;
use crate::notify::Notice;
use crate::validation::{describe, validate_response};
use crate::visit::{machine, task, ActionKind, Coordinates, TaskId, TaskStatus, Visit, VisitAction, VisitId};
use chrono::Utc;
use stillwater::validation::Validation;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy)]
enum Clock {
    In,
    Out,
}

impl Clock {
    fn action(self) -> ActionKind {
        match self {
            Clock::In => ActionKind::CheckIn,
            Clock::Out => ActionKind::CheckOut,
        }
    }

    fn apply(self, location: Coordinates) -> VisitAction {
        match self {
            Clock::In => VisitAction::CheckIn(location),
            Clock::Out => VisitAction::CheckOut(location),
        }
    }
}

/// The lifecycle engine: collaborators plus configuration.
///
/// The engine itself is stateless; per-visit state lives in [`TrackedVisit`].
/// One engine can drive any number of visits.
#[derive(Debug)]
pub struct VisitLifecycle<L, R> {
    location: L,
    store: R,
    config: EngineConfig,
}

impl<L, R> VisitLifecycle<L, R>
where
    L: LocationProvider,
    R: RemoteVisitStore,
{
    pub fn new(location: L, store: R) -> Self {
        Self::with_config(location, store, EngineConfig::default())
    }

    pub fn with_config(location: L, store: R, config: EngineConfig) -> Self {
        Self {
            location,
            store,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn location_provider(&self) -> &L {
        &self.location
    }

    pub fn store(&self) -> &R {
        &self.store
    }

    /// Fetch a visit from the store and start tracking it.
    pub async fn load(&self, visit_id: &VisitId) -> Result<TrackedVisit, LifecycleError> {
        debug!(visit_id = %visit_id, "loading visit");
        let visit = self
            .store
            .fetch_visit(visit_id)
            .await
            .map_err(|e| self.rejected(visit_id, ActionKind::Refresh, e))?;
        let visit = self.validated(visit_id, ActionKind::Refresh, visit)?;
        Ok(TrackedVisit::new(visit))
    }

    /// Check in at the device's current location.
    pub async fn perform_check_in(&self, tracked: &TrackedVisit) -> Result<Visit, LifecycleError> {
        self.clock(tracked, Clock::In).await
    }

    /// Check out at the device's current location.
    pub async fn perform_check_out(&self, tracked: &TrackedVisit) -> Result<Visit, LifecycleError> {
        self.clock(tracked, Clock::Out).await
    }

    async fn clock(&self, tracked: &TrackedVisit, clock: Clock) -> Result<Visit, LifecycleError> {
        let action = clock.action();
        let _token = tracked.begin(action)?;
        debug!(visit_id = %tracked.id(), action = action.name(), "acquiring location");

        let location = acquire_location(&self.location, self.config.location_timeout())
            .await
            .map_err(|e| {
                warn!(visit_id = %tracked.id(), action = action.name(), error = %e, "location unavailable");
                LifecycleError::from(e)
            })?;

        let current = tracked.current();
        let at = Utc::now();
        let local = machine::transition(&current, clock.apply(location), at)?;
        debug!(
            visit_id = %tracked.id(),
            action = action.name(),
            from = %current.status,
            to = %local.status,
            "local transition accepted"
        );

        let submission = Submission {
            timestamp: at,
            location,
        };
        let outcome = match clock {
            Clock::In => self.store.submit_check_in(tracked.id(), submission).await,
            Clock::Out => self.store.submit_check_out(tracked.id(), submission).await,
        };
        let confirmed = outcome.map_err(|e| self.rejected(tracked.id(), action, e))?;
        let confirmed = self.validated(tracked.id(), action, confirmed)?;
        Ok(self.adopt(tracked, confirmed, action))
    }

    /// Cancel an upcoming visit. No location is needed.
    pub async fn perform_cancel(&self, tracked: &TrackedVisit) -> Result<Visit, LifecycleError> {
        let action = ActionKind::Cancel;
        let _token = tracked.begin(action)?;

        let current = tracked.current();
        machine::cancel(&current, Utc::now())?;
        debug!(visit_id = %tracked.id(), from = %current.status, "local cancel accepted");

        let confirmed = self
            .store
            .submit_cancel(tracked.id())
            .await
            .map_err(|e| self.rejected(tracked.id(), action, e))?;
        let confirmed = self.validated(tracked.id(), action, confirmed)?;
        Ok(self.adopt(tracked, confirmed, action))
    }

    /// Move one task to `status`; the store's version of the task replaces
    /// the local one.
    pub async fn perform_task_update(
        &self,
        tracked: &TrackedVisit,
        task_id: &TaskId,
        status: TaskStatus,
        feedback: Option<String>,
    ) -> Result<Visit, LifecycleError> {
        let action = ActionKind::UpdateTask;
        let _token = tracked.begin(action)?;

        let current = tracked.current();
        let existing = current
            .task(task_id)
            .ok_or_else(|| LifecycleError::UnknownTask(task_id.clone()))?;
        let local = task::apply_status(existing, status, feedback)?;
        debug!(visit_id = %tracked.id(), task_id = %task_id, to = %local.status, "local task update accepted");

        let update = TaskUpdate {
            status: local.status,
            feedback: local.feedback,
        };
        let confirmed = self
            .store
            .submit_task_update(tracked.id(), task_id, update)
            .await
            .map_err(|e| self.rejected(tracked.id(), action, e))?;

        if &confirmed.id != task_id {
            let reason = format!("expected task '{task_id}', got '{}'", confirmed.id);
            return Err(self.rejected(tracked.id(), action, RemoteError::Malformed(reason)));
        }
        let next = current
            .with_task_replaced(confirmed)
            .ok_or_else(|| LifecycleError::UnknownTask(task_id.clone()))?;
        let next = self.validated(tracked.id(), action, next)?;
        Ok(self.adopt(tracked, next, action))
    }

    /// Store the free-text service note. Allowed in every status; a blank
    /// note clears it.
    pub async fn perform_save_note(
        &self,
        tracked: &TrackedVisit,
        note: &str,
    ) -> Result<Visit, LifecycleError> {
        let action = ActionKind::SaveNote;
        let _token = tracked.begin(action)?;

        let stored = self
            .store
            .submit_service_note(tracked.id(), note.trim())
            .await
            .map_err(|e| self.rejected(tracked.id(), action, e))?;

        let mut next = tracked.current();
        next.service_note = Some(stored).filter(|n| !n.trim().is_empty());
        Ok(self.adopt(tracked, next, action))
    }

    /// Re-read the visit from the store and adopt whatever it says.
    pub async fn refresh(&self, tracked: &TrackedVisit) -> Result<Visit, LifecycleError> {
        let action = ActionKind::Refresh;
        let _token = tracked.begin(action)?;

        let fetched = self
            .store
            .fetch_visit(tracked.id())
            .await
            .map_err(|e| self.rejected(tracked.id(), action, e))?;
        let fetched = self.validated(tracked.id(), action, fetched)?;
        Ok(self.adopt(tracked, fetched, action))
    }

    /// User-facing notice for the outcome of `action`.
    pub fn notice(&self, action: ActionKind, outcome: &Result<Visit, LifecycleError>) -> Notice {
        Notice::for_result(action, outcome, &self.config, Utc::now())
    }

    fn rejected(&self, visit_id: &VisitId, action: ActionKind, error: RemoteError) -> LifecycleError {
        warn!(visit_id = %visit_id, action = action.name(), error = %error, "remote store rejected action");
        LifecycleError::RemoteRejected(error)
    }

    fn validated(
        &self,
        visit_id: &VisitId,
        action: ActionKind,
        visit: Visit,
    ) -> Result<Visit, LifecycleError> {
        match validate_response(visit_id, &visit) {
            Validation::Success(_) => Ok(visit),
            Validation::Failure(violations) => Err(self.rejected(
                visit_id,
                action,
                RemoteError::Malformed(describe(&violations)),
            )),
        }
    }

    fn adopt(&self, tracked: &TrackedVisit, confirmed: Visit, action: ActionKind) -> Visit {
        let from = tracked.status();
        let visit = tracked.adopt(confirmed, action);
        info!(
            visit_id = %tracked.id(),
            action = action.name(),
            from = %from,
            to = %visit.status,
            "adopted confirmed visit"
        );
        visit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::LocationError;
    use crate::error::ErrorKind;
    use crate::testing::{InMemoryVisitStore, ScriptedLocation, StoreCall};
    use crate::visit::{ScheduledSlot, Task, VisitStatus};
    use chrono::{Duration as ChronoDuration, TimeZone};
    use std::time::Duration;

    fn upcoming() -> Visit {
        let from = Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap();
        Visit::scheduled(
            "v1",
            ScheduledSlot::new(from, from + ChronoDuration::minutes(90)).unwrap(),
        )
        .with_task(Task::pending("t1", "Medication", "Morning dose"))
        .with_task(Task::pending("t2", "Lunch", "Prepare lunch"))
    }

    fn engine(location: ScriptedLocation) -> VisitLifecycle<ScriptedLocation, InMemoryVisitStore> {
        VisitLifecycle::new(location, InMemoryVisitStore::new().with_visit(upcoming()))
    }

    async fn loaded(
        engine: &VisitLifecycle<ScriptedLocation, InMemoryVisitStore>,
    ) -> TrackedVisit {
        engine.load(&VisitId::new("v1")).await.unwrap()
    }

    #[tokio::test]
    async fn check_in_adopts_confirmed_visit() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;

        let visit = engine.perform_check_in(&tracked).await.unwrap();

        assert_eq!(visit.status, VisitStatus::InProgress);
        assert_eq!(visit.checkin_location, Some(Coordinates::new(10.0, 20.0)));
        assert!(visit.checkin_time.is_some());
        assert_eq!(tracked.current(), visit);
        assert_eq!(tracked.history().transitions().len(), 1);
        assert_eq!(tracked.pending_action(), None);
    }

    #[tokio::test]
    async fn concurrent_check_ins_admit_exactly_one() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0).with_delay(Duration::from_millis(30)));
        let tracked = loaded(&engine).await;

        let (first, second) = tokio::join!(
            engine.perform_check_in(&tracked),
            engine.perform_check_in(&tracked)
        );

        assert!(first.is_ok());
        let err = second.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ActionInProgress);
        assert_eq!(engine.location_provider().calls(), 1);
        assert_eq!(tracked.status(), VisitStatus::InProgress);
    }

    #[tokio::test]
    async fn location_failure_skips_the_store() {
        let engine = engine(ScriptedLocation::failing(LocationError::PermissionDenied));
        let tracked = loaded(&engine).await;
        let calls_before = engine.store().call_count();

        let err = engine.perform_check_in(&tracked).await.unwrap_err();

        assert_eq!(
            err,
            LifecycleError::LocationUnavailable(LocationError::PermissionDenied)
        );
        assert_eq!(engine.store().call_count(), calls_before);
        assert_eq!(tracked.status(), VisitStatus::Upcoming);
    }

    #[tokio::test]
    async fn slow_location_times_out() {
        let config = EngineConfig::builder()
            .location_timeout(Duration::from_millis(10))
            .build()
            .unwrap();
        let engine = VisitLifecycle::with_config(
            ScriptedLocation::at(1.0, 1.0).with_delay(Duration::from_millis(300)),
            InMemoryVisitStore::new().with_visit(upcoming()),
            config,
        );
        let tracked = loaded(&engine).await;

        let err = engine.perform_check_in(&tracked).await.unwrap_err();
        assert_eq!(err, LifecycleError::LocationUnavailable(LocationError::Timeout));
        assert_eq!(tracked.pending_action(), None);
    }

    #[tokio::test]
    async fn rejected_check_out_leaves_visit_in_progress() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        engine.perform_check_in(&tracked).await.unwrap();

        engine.store().fail_next(RemoteError::Rejected {
            status: 500,
            message: "database unavailable".to_string(),
        });
        let err = engine.perform_check_out(&tracked).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::RemoteRejected);
        let visit = tracked.current();
        assert_eq!(visit.status, VisitStatus::InProgress);
        assert!(visit.checkout_time.is_none());
    }

    #[tokio::test]
    async fn invalid_local_transition_never_reaches_the_store() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        let calls_before = engine.store().call_count();

        let err = engine.perform_check_out(&tracked).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(engine.store().call_count(), calls_before);
    }

    #[tokio::test]
    async fn cancel_after_check_in_is_invalid() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        engine.perform_check_in(&tracked).await.unwrap();

        let err = engine.perform_cancel(&tracked).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(tracked.status(), VisitStatus::InProgress);
    }

    #[tokio::test]
    async fn cancel_marks_visit_cancelled() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;

        let visit = engine.perform_cancel(&tracked).await.unwrap();
        assert_eq!(visit.status, VisitStatus::Cancelled);
        assert!(engine
            .store()
            .calls()
            .contains(&StoreCall::Cancel(VisitId::new("v1"))));
    }

    #[tokio::test]
    async fn malformed_response_is_not_adopted() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;

        let mut broken = upcoming();
        broken.status = VisitStatus::InProgress;
        engine.store().respond_next_with(broken);

        let err = engine.perform_check_in(&tracked).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::RemoteRejected(RemoteError::Malformed(_))
        ));
        assert_eq!(tracked.status(), VisitStatus::Upcoming);
    }

    #[tokio::test]
    async fn task_update_replaces_task_by_id() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        let t1 = TaskId::new("t1");

        let visit = engine
            .perform_task_update(&tracked, &t1, TaskStatus::Completed, Some("looks good".into()))
            .await
            .unwrap();

        let task = visit.task(&t1).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.feedback.as_deref(), Some("looks good"));
        assert_eq!(visit.task_progress().completed, 1);

        let err = engine
            .perform_task_update(&tracked, &t1, TaskStatus::Completed, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[tokio::test]
    async fn unknown_task_is_reported() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;

        let err = engine
            .perform_task_update(&tracked, &TaskId::new("t9"), TaskStatus::Completed, None)
            .await
            .unwrap_err();
        assert_eq!(err, LifecycleError::UnknownTask(TaskId::new("t9")));
    }

    #[tokio::test]
    async fn save_note_works_in_terminal_status() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        engine.perform_cancel(&tracked).await.unwrap();

        let visit = engine
            .perform_save_note(&tracked, "  client was away  ")
            .await
            .unwrap();
        assert_eq!(visit.service_note.as_deref(), Some("client was away"));

        let visit = engine.perform_save_note(&tracked, "   ").await.unwrap();
        assert_eq!(visit.service_note, None);
    }

    #[tokio::test]
    async fn refresh_adopts_server_state() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;

        let elsewhere = machine::cancel(&upcoming(), Utc::now()).unwrap();
        engine.store().respond_next_with(elsewhere);

        let visit = engine.refresh(&tracked).await.unwrap();
        assert_eq!(visit.status, VisitStatus::Cancelled);
        assert_eq!(tracked.history().last().unwrap().trigger, "refresh");
    }

    #[tokio::test]
    async fn dropping_the_action_releases_the_slot() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0).with_delay(Duration::from_millis(300)));
        let tracked = loaded(&engine).await;

        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), engine.perform_check_in(&tracked)).await;
        assert!(abandoned.is_err());

        assert_eq!(tracked.pending_action(), None);
        assert_eq!(tracked.status(), VisitStatus::Upcoming);
        assert!(engine.perform_cancel(&tracked).await.is_ok());
    }

    fn network_down() -> RemoteError {
        RemoteError::Network("connection reset".to_string())
    }

    fn assert_untouched(tracked: &TrackedVisit, before: &Visit, err: &LifecycleError) {
        assert!(matches!(
            err,
            LifecycleError::RemoteRejected(RemoteError::Network(_))
        ));
        assert_eq!(&tracked.current(), before);
        assert_eq!(tracked.pending_action(), None);
        assert!(tracked.history().transitions().is_empty());
    }

    #[tokio::test]
    async fn rejected_cancel_keeps_visit_upcoming() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        let before = tracked.current();

        engine.store().fail_next(network_down());
        let err = engine.perform_cancel(&tracked).await.unwrap_err();

        assert_untouched(&tracked, &before, &err);
        assert_eq!(tracked.status(), VisitStatus::Upcoming);
    }

    #[tokio::test]
    async fn rejected_task_update_keeps_task_pending() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        let before = tracked.current();
        let t1 = TaskId::new("t1");

        engine.store().fail_next(network_down());
        let err = engine
            .perform_task_update(&tracked, &t1, TaskStatus::Completed, Some("done".into()))
            .await
            .unwrap_err();

        assert_untouched(&tracked, &before, &err);
        let task = tracked.current().task(&t1).cloned().unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.feedback, None);
    }

    #[tokio::test]
    async fn rejected_note_keeps_previous_note() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        engine.perform_save_note(&tracked, "first visit").await.unwrap();
        let before = tracked.current();

        engine.store().fail_next(network_down());
        let err = engine
            .perform_save_note(&tracked, "second thoughts")
            .await
            .unwrap_err();

        assert_untouched(&tracked, &before, &err);
        assert_eq!(tracked.current().service_note.as_deref(), Some("first visit"));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_confirmed_visit() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        let before = tracked.current();

        engine.store().fail_next(network_down());
        let err = engine.refresh(&tracked).await.unwrap_err();

        assert_untouched(&tracked, &before, &err);
        assert!(engine.refresh(&tracked).await.is_ok());
    }

    #[tokio::test]
    async fn task_answer_for_another_task_is_not_adopted() {
        let engine = engine(ScriptedLocation::at(10.0, 20.0));
        let tracked = loaded(&engine).await;
        let before = tracked.current();

        let mut other = Task::pending("t2", "Lunch", "Prepare lunch");
        other.status = TaskStatus::Completed;
        engine.store().respond_next_task_with(other);

        let err = engine
            .perform_task_update(&tracked, &TaskId::new("t1"), TaskStatus::Completed, None)
            .await
            .unwrap_err();

        match err {
            LifecycleError::RemoteRejected(RemoteError::Malformed(reason)) => {
                assert!(reason.contains("expected task 't1'"));
                assert!(reason.contains("'t2'"));
            }
            other => panic!("Expected Malformed, got {other:?}"),
        }
        assert_eq!(tracked.current(), before);
        assert_eq!(tracked.pending_action(), None);
    }

    #[tokio::test]
    async fn different_visits_check_in_independently() {
        let mut second = upcoming();
        second.id = VisitId::new("v2");
        let engine = VisitLifecycle::new(
            ScriptedLocation::at(10.0, 20.0).with_delay(Duration::from_millis(30)),
            InMemoryVisitStore::new()
                .with_visit(upcoming())
                .with_visit(second),
        );
        let first = engine.load(&VisitId::new("v1")).await.unwrap();
        let second = engine.load(&VisitId::new("v2")).await.unwrap();

        let (a, b) = tokio::join!(
            engine.perform_check_in(&first),
            engine.perform_check_in(&second)
        );

        assert_eq!(a.unwrap().status, VisitStatus::InProgress);
        assert_eq!(b.unwrap().status, VisitStatus::InProgress);
        assert_eq!(engine.location_provider().calls(), 2);
        assert_eq!(first.pending_action(), None);
        assert_eq!(second.pending_action(), None);
    }
}
