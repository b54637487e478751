//! Core `State` trait for lifecycle statuses.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for lifecycle statuses.
///
/// All methods are pure. Implementors are small value enums, usually
/// generated with [`state_enum!`](crate::state_enum).
///
/// # Example
///
/// ```rust
/// use caretrack::core::State;
/// use caretrack::VisitStatus;
///
/// assert_eq!(VisitStatus::InProgress.name(), "InProgress");
/// assert!(VisitStatus::Cancelled.is_final());
/// assert!(!VisitStatus::Upcoming.is_final());
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Stable identifier used in logs and transition records.
    fn name(&self) -> &str;

    /// Terminal statuses accept no further transitions.
    ///
    /// Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}
