//! Snapshot error types.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SnapshotError {
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// The captured visit breaks a data-model invariant.
    #[error("Snapshot validation failed: {0}")]
    ValidationFailed(String),
}
