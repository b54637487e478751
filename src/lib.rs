//! Caretrack: the visit lifecycle engine behind a field-service visit tracker.
//!
//! Caregivers check in to a scheduled visit, work through its checklist and
//! check out; both clock events are stamped with the device location. This
//! crate owns the rules for that lifecycle and leaves rendering, routing and
//! HTTP to the host application.
//!
//! The design keeps a pure core and an imperative shell:
//!
//! - [`visit`]: the data model plus the visit and task state machines. Pure
//!   functions from `(state, action, time)` to a new state or a typed error.
//! - [`view`]: the derived view (badge, buttons, editability) as a pure
//!   projection of a visit.
//! - [`orchestrator`]: the guarded actions. They claim the visit's
//!   in-flight slot, ask the [`LocationProvider`] for coordinates, submit to
//!   the [`RemoteVisitStore`] and adopt the server's answer.
//!
//! # Example
//!
//! ```rust
//! use caretrack::testing::{InMemoryVisitStore, ScriptedLocation};
//! use caretrack::{ScheduledSlot, Visit, VisitId, VisitLifecycle, VisitStatus};
//! use chrono::{Duration, Utc};
//!
//! # tokio_test_runtime(async {
//! let now = Utc::now();
//! let visit = Visit::scheduled("v1", ScheduledSlot::new(now, now + Duration::hours(1)).unwrap());
//! let engine = VisitLifecycle::new(
//!     ScriptedLocation::at(10.0, 20.0),
//!     InMemoryVisitStore::new().with_visit(visit),
//! );
//!
//! let tracked = engine.load(&VisitId::new("v1")).await.unwrap();
//! let visit = engine.perform_check_in(&tracked).await.unwrap();
//! assert_eq!(visit.status, VisitStatus::InProgress);
//! assert_eq!(tracked.view().primary_action.unwrap().label, "Clock-Out Now");
//! # });
//! # fn tokio_test_runtime<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
//! # }
//! ```

#[macro_use]
mod macros;

pub mod adapter;
pub mod collaborators;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod notify;
pub mod orchestrator;
pub mod snapshot;
pub mod testing;
pub mod validation;
pub mod view;
pub mod visit;

pub use collaborators::{LocationError, LocationProvider, RemoteError, RemoteVisitStore};
pub use config::EngineConfig;
pub use error::{ErrorKind, LifecycleError};
pub use notify::{Notice, NoticeTone};
pub use orchestrator::{TrackedVisit, VisitLifecycle};
pub use view::{project_view, VisitView};
pub use visit::{
    ActionKind, Coordinates, ScheduledSlot, Task, TaskId, TaskStatus, Visit, VisitId, VisitStatus,
};
