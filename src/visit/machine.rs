//! Visit state machine.
//!
//! The legal moves are held in a static rule table. Each rule names the
//! action, the source and target status, and an optional [`Guard`] over the
//! whole visit. Applying an action is a pure function: it clones the visit,
//! stamps the check-in/check-out fields and returns the copy, or returns
//! [`LifecycleError::InvalidTransition`] without touching anything.

use super::action::{ActionKind, VisitAction};
use super::model::Visit;
use super::status::VisitStatus;
use crate::collaborators::LocationError;
use crate::core::Guard;
use crate::error::LifecycleError;
use chrono::{DateTime, Utc};
use std::sync::OnceLock;

/// One legal move of the visit machine.
#[derive(Debug)]
pub struct TransitionRule {
    pub action: ActionKind,
    pub from: VisitStatus,
    pub to: VisitStatus,
    pub guard: Option<Guard<Visit>>,
}

impl TransitionRule {
    /// Whether this rule applies to `action` on `visit` (pure).
    pub fn can_execute(&self, visit: &Visit, action: ActionKind) -> bool {
        if self.action != action || visit.status != self.from {
            return false;
        }
        self.guard.as_ref().is_none_or(|g| g.check(visit))
    }
}

/// The complete rule table.
pub fn rules() -> &'static [TransitionRule] {
    static RULES: OnceLock<Vec<TransitionRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        vec![
            TransitionRule {
                action: ActionKind::CheckIn,
                from: VisitStatus::Upcoming,
                to: VisitStatus::InProgress,
                guard: Some(Guard::new(|v: &Visit| v.checkin_time.is_none())),
            },
            TransitionRule {
                action: ActionKind::Cancel,
                from: VisitStatus::Upcoming,
                to: VisitStatus::Cancelled,
                guard: Some(Guard::new(|v: &Visit| v.checkin_time.is_none())),
            },
            TransitionRule {
                action: ActionKind::CheckOut,
                from: VisitStatus::InProgress,
                to: VisitStatus::Completed,
                guard: Some(Guard::new(|v: &Visit| {
                    v.checkin_time.is_some() && v.checkout_time.is_none()
                })),
            },
        ]
    })
}

fn find_rule(visit: &Visit, action: ActionKind) -> Option<&'static TransitionRule> {
    rules().iter().find(|rule| rule.can_execute(visit, action))
}

/// Whether `action` would be accepted for `visit` right now.
pub fn can_apply(visit: &Visit, action: ActionKind) -> bool {
    find_rule(visit, action).is_some()
}

/// Apply `action` to `visit` as of `at`.
pub fn transition(
    visit: &Visit,
    action: VisitAction,
    at: DateTime<Utc>,
) -> Result<Visit, LifecycleError> {
    let kind = action.kind();
    let rule = find_rule(visit, kind)
        .ok_or_else(|| LifecycleError::invalid_visit(kind, visit.status))?;

    let mut next = visit.clone();
    match action {
        VisitAction::CheckIn(location) => {
            if !location.is_valid() {
                return Err(LocationError::PositionUnavailable.into());
            }
            next.checkin_time = Some(at);
            next.checkin_location = Some(location);
        }
        VisitAction::CheckOut(location) => {
            if !location.is_valid() {
                return Err(LocationError::PositionUnavailable.into());
            }
            next.checkout_time = Some(at);
            next.checkout_location = Some(location);
        }
        VisitAction::Cancel => {}
    }
    next.status = rule.to;
    Ok(next)
}

/// Start an upcoming visit at `location`.
///
/// # Example
///
/// ```rust
/// use caretrack::visit::machine;
/// use caretrack::{Coordinates, ScheduledSlot, Visit, VisitStatus};
/// use chrono::{Duration, Utc};
///
/// let from = Utc::now();
/// let visit = Visit::scheduled("v1", ScheduledSlot::new(from, from + Duration::hours(1)).unwrap());
/// let here = Coordinates::new(51.5, -0.12);
///
/// let started = machine::check_in(&visit, here, from).unwrap();
/// assert_eq!(started.status, VisitStatus::InProgress);
/// assert_eq!(started.checkin_location, Some(here));
/// assert_eq!(visit.status, VisitStatus::Upcoming);
/// ```
pub fn check_in(
    visit: &Visit,
    location: super::Coordinates,
    at: DateTime<Utc>,
) -> Result<Visit, LifecycleError> {
    transition(visit, VisitAction::CheckIn(location), at)
}

/// Finish an in-progress visit at `location`. Pending tasks do not block it.
pub fn check_out(
    visit: &Visit,
    location: super::Coordinates,
    at: DateTime<Utc>,
) -> Result<Visit, LifecycleError> {
    transition(visit, VisitAction::CheckOut(location), at)
}

/// Cancel a visit that has not started.
pub fn cancel(visit: &Visit, at: DateTime<Utc>) -> Result<Visit, LifecycleError> {
    transition(visit, VisitAction::Cancel, at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, Subject};
    use crate::visit::{Coordinates, ScheduledSlot};
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, hour, 0, 0).unwrap()
    }

    fn upcoming() -> Visit {
        Visit::scheduled("v1", ScheduledSlot::new(at(9), at(11)).unwrap())
    }

    fn here() -> Coordinates {
        Coordinates::new(10.0, 20.0)
    }

    #[test]
    fn check_in_moves_upcoming_to_in_progress() {
        let visit = check_in(&upcoming(), here(), at(9)).unwrap();

        assert_eq!(visit.status, VisitStatus::InProgress);
        assert_eq!(visit.checkin_time, Some(at(9)));
        assert_eq!(visit.checkin_location, Some(here()));
        assert!(visit.checkout_time.is_none());
    }

    #[test]
    fn check_out_completes_an_in_progress_visit() {
        let started = check_in(&upcoming(), here(), at(9)).unwrap();
        let done = check_out(&started, Coordinates::new(10.5, 20.5), at(10)).unwrap();

        assert_eq!(done.status, VisitStatus::Completed);
        assert_eq!(done.checkin_time, Some(at(9)));
        assert_eq!(done.checkout_time, Some(at(10)));
        assert_eq!(done.checkout_location, Some(Coordinates::new(10.5, 20.5)));
    }

    #[test]
    fn cancel_only_before_check_in() {
        let cancelled = cancel(&upcoming(), at(8)).unwrap();
        assert_eq!(cancelled.status, VisitStatus::Cancelled);
        assert!(cancelled.checkin_time.is_none());

        let started = check_in(&upcoming(), here(), at(9)).unwrap();
        let err = cancel(&started, at(9)).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                subject: Subject::Visit,
                action: ActionKind::Cancel,
                from: "in progress".to_string(),
            }
        );
    }

    #[test]
    fn check_out_requires_in_progress() {
        let err = check_out(&upcoming(), here(), at(9)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn terminal_states_reject_everything() {
        let cancelled = cancel(&upcoming(), at(8)).unwrap();
        let completed = check_out(&check_in(&upcoming(), here(), at(9)).unwrap(), here(), at(10)).unwrap();

        for visit in [cancelled, completed] {
            for action in [
                VisitAction::CheckIn(here()),
                VisitAction::CheckOut(here()),
                VisitAction::Cancel,
            ] {
                let err = transition(&visit, action, at(11)).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::InvalidTransition);
            }
        }
    }

    #[test]
    fn invalid_location_is_rejected_before_any_change() {
        let err = check_in(&upcoming(), Coordinates::new(f64::NAN, 0.0), at(9)).unwrap_err();
        assert_eq!(
            err,
            LifecycleError::LocationUnavailable(LocationError::PositionUnavailable)
        );
    }

    #[test]
    fn guard_blocks_inconsistent_upcoming_visit() {
        let mut odd = upcoming();
        odd.checkin_time = Some(at(9));

        assert!(!can_apply(&odd, ActionKind::CheckIn));
        assert!(!can_apply(&odd, ActionKind::Cancel));
    }

    #[test]
    fn can_apply_matches_the_table() {
        let visit = upcoming();
        assert!(can_apply(&visit, ActionKind::CheckIn));
        assert!(can_apply(&visit, ActionKind::Cancel));
        assert!(!can_apply(&visit, ActionKind::CheckOut));
        assert!(!can_apply(&visit, ActionKind::UpdateTask));
    }

    #[test]
    fn input_visit_is_never_mutated() {
        let visit = upcoming();
        let before = visit.clone();
        let _ = check_in(&visit, here(), at(9));
        let _ = cancel(&visit, at(9));
        assert_eq!(visit, before);
    }
}
