//! Contracts for the two collaborators the engine drives.
//!
//! Neither trait is implemented in this crate outside of
//! [`testing`](crate::testing): device geolocation and HTTP transport live in
//! the host application.

mod location;
mod store;

pub use location::{acquire_location, LocationError, LocationProvider};
pub use store::{RemoteError, RemoteVisitStore, Submission, TaskUpdate};
