use crate::validation::VisitViolation;
use crate::visit::SlotError;
use thiserror::Error;

/// One problem found while decoding a wire visit.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecodeError {
    #[error("unknown visit status '{0}'")]
    UnknownVisitStatus(String),

    #[error("task '{task}' has unknown status '{value}'")]
    UnknownTaskStatus { task: String, value: String },

    #[error("{field} is not an RFC 3339 timestamp: '{value}'")]
    BadTimestamp { field: &'static str, value: String },

    #[error("scheduled slot: {0}")]
    Slot(#[from] SlotError),

    #[error("{field} has only one of lat/long")]
    HalfLocation { field: &'static str },

    #[error("{0}")]
    Invariant(#[from] VisitViolation),
}

/// Every problem found in one wire visit.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("cannot decode visit: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
pub struct DecodeFailure(pub Vec<DecodeError>);

impl DecodeFailure {
    pub fn problems(&self) -> &[DecodeError] {
        &self.0
    }
}
