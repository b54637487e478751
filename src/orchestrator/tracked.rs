//! A loaded visit under the engine's control.

use super::slot::{InFlightSlot, InFlightToken};
use crate::core::{StateHistory, StateTransition};
use crate::error::LifecycleError;
use crate::view::{project_view_pending, VisitView};
use crate::visit::{ActionKind, Visit, VisitId, VisitStatus};
use chrono::Utc;
use std::sync::{Mutex, PoisonError, RwLock};

/// One visit plus its in-flight slot and confirmed-transition history.
///
/// Share it behind an `Arc` when several tasks act on the same visit; the
/// slot guarantees at most one guarded action runs at a time. The visit is
/// only ever replaced by a representation the remote store confirmed.
#[derive(Debug)]
pub struct TrackedVisit {
    id: VisitId,
    visit: RwLock<Visit>,
    slot: InFlightSlot,
    history: Mutex<StateHistory<VisitStatus>>,
}

impl TrackedVisit {
    pub fn new(visit: Visit) -> Self {
        Self::with_history(visit, StateHistory::new())
    }

    pub(crate) fn with_history(visit: Visit, history: StateHistory<VisitStatus>) -> Self {
        Self {
            id: visit.id.clone(),
            visit: RwLock::new(visit),
            slot: InFlightSlot::default(),
            history: Mutex::new(history),
        }
    }

    pub fn id(&self) -> &VisitId {
        &self.id
    }

    /// Copy of the last confirmed visit.
    pub fn current(&self) -> Visit {
        self.visit
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn status(&self) -> VisitStatus {
        self.visit
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    pub fn history(&self) -> StateHistory<VisitStatus> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The guarded action currently running, if any.
    pub fn pending_action(&self) -> Option<ActionKind> {
        self.slot.current()
    }

    /// View state including the running action's progress labels.
    pub fn view(&self) -> VisitView {
        project_view_pending(&self.current(), self.pending_action())
    }

    pub(crate) fn begin(&self, action: ActionKind) -> Result<InFlightToken<'_>, LifecycleError> {
        self.slot
            .try_claim(action)
            .map_err(|pending| LifecycleError::ActionInProgress {
                visit_id: self.id.clone(),
                requested: action,
                pending,
            })
    }

    /// Replace the visit with a confirmed representation.
    ///
    /// Records a history entry when the status changed.
    pub(crate) fn adopt(&self, confirmed: Visit, action: ActionKind) -> Visit {
        let previous = {
            let mut visit = self.visit.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *visit, confirmed.clone()).status
        };

        if previous != confirmed.status {
            let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
            *history = history.record(StateTransition {
                from: previous,
                to: confirmed.status,
                timestamp: Utc::now(),
                trigger: action.name().to_string(),
            });
        }
        confirmed
    }
}
