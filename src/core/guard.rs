//! Guard predicates for controlling transitions.
//!
//! Guards are pure boolean functions evaluated against the aggregate
//! before a transition is applied. They never mutate and never block.

use std::fmt;

/// Pure predicate that decides whether a transition may run.
///
/// # Example
///
/// ```rust
/// use caretrack::core::Guard;
///
/// let non_empty = Guard::new(|note: &String| !note.trim().is_empty());
///
/// assert!(non_empty.check(&"gate code 4411".to_string()));
/// assert!(!non_empty.check(&"   ".to_string()));
/// ```
pub struct Guard<T> {
    predicate: Box<dyn Fn(&T) -> bool + Send + Sync>,
}

impl<T> Guard<T> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the predicate.
    pub fn check(&self, value: &T) -> bool {
        (self.predicate)(value)
    }
}

impl<T> fmt::Debug for Guard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
