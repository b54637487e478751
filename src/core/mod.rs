//! Pure building blocks shared by the visit and task machines.
//!
//! - `State` describes a lifecycle status (name, terminal-ness)
//! - `Guard` wraps a pure predicate evaluated before a transition
//! - `StateHistory` is an append-only log of confirmed transitions
//!
//! Nothing in here performs I/O or reads the clock.

mod guard;
mod history;
mod state;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use state::State;
