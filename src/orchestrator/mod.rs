//! Guarded action orchestrator.
//!
//! [`VisitLifecycle`] sequences the collaborators for each action and
//! [`TrackedVisit`] holds the per-visit state it acts on.

mod engine;
mod slot;
mod tracked;

pub use engine::VisitLifecycle;
pub use tracked::TrackedVisit;
