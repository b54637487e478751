//! Accumulating invariant checks for visit representations.
//!
//! Every visit that crosses the boundary (decoded from the wire, returned by
//! the remote store, restored from a snapshot) goes through
//! [`validate_visit`]. Failures carry *all* violations rather than the first.
//!
//! ```rust
//! use caretrack::validation::validate_visit;
//! use caretrack::{ScheduledSlot, Visit, VisitStatus};
//! use chrono::{Duration, Utc};
//!
//! let now = Utc::now();
//! let mut visit = Visit::scheduled("v1", ScheduledSlot::new(now, now + Duration::hours(1)).unwrap());
//! assert!(validate_visit(&visit).is_success());
//!
//! visit.status = VisitStatus::Completed;
//! assert!(validate_visit(&visit).is_failure());
//! ```

pub mod rules;
pub mod violations;

pub use rules::{describe, validate_response, validate_visit, VisitValidation};
pub use violations::VisitViolation;
