//! Visit invariant checks using Validation.
//!
//! Each rule yields its own `Validation`; they are combined with
//! `Validation::all_vec` so a caller sees every broken invariant at once.

use crate::validation::violations::VisitViolation;
use crate::visit::{Coordinates, Visit, VisitId, VisitStatus};
use std::collections::HashSet;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of an invariant check.
pub type VisitValidation = Validation<(), NonEmptyVec<VisitViolation>>;

fn check(ok: bool, violation: impl FnOnce() -> VisitViolation) -> VisitValidation {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

fn location_in_range(location: Option<Coordinates>) -> bool {
    location.is_none_or(|c| c.is_valid())
}

/// Check every data-model invariant of `visit`.
pub fn validate_visit(visit: &Visit) -> VisitValidation {
    let status = visit.status;
    let mut checks: Vec<VisitValidation> = Vec::new();

    checks.push(check(
        visit.checkin_time.is_some() == status.is_checked_in(),
        || VisitViolation::CheckinTimeMismatch { status },
    ));
    checks.push(check(
        visit.checkout_time.is_some() == (status == VisitStatus::Completed),
        || VisitViolation::CheckoutTimeMismatch { status },
    ));
    checks.push(check(
        visit.checkin_time.is_some() == visit.checkin_location.is_some(),
        || VisitViolation::CheckinLocationMismatch,
    ));
    checks.push(check(
        visit.checkout_time.is_some() == visit.checkout_location.is_some(),
        || VisitViolation::CheckoutLocationMismatch,
    ));

    if let (Some(checkin), Some(checkout)) = (visit.checkin_time, visit.checkout_time) {
        checks.push(check(checkout >= checkin, || {
            VisitViolation::CheckoutBeforeCheckin
        }));
    }

    checks.push(check(
        location_in_range(visit.checkin_location) && location_in_range(visit.checkout_location),
        || VisitViolation::LocationOutOfRange,
    ));

    let mut seen = HashSet::new();
    for task in &visit.tasks {
        checks.push(check(task.feedback.is_none() || task.is_completed(), || {
            VisitViolation::FeedbackOnPendingTask(task.id.clone())
        }));
        checks.push(check(seen.insert(&task.id), || {
            VisitViolation::DuplicateTask(task.id.clone())
        }));
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Validate a representation returned for `expected`.
pub fn validate_response(expected: &VisitId, visit: &Visit) -> VisitValidation {
    let identity = check(&visit.id == expected, || VisitViolation::WrongVisit {
        expected: expected.to_string(),
        found: visit.id.to_string(),
    });
    Validation::all_vec(vec![identity, validate_visit(visit)]).map(|_| ())
}

/// Collapse a failed validation into a single readable line.
pub fn describe(violations: &NonEmptyVec<VisitViolation>) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
