//! Session snapshots.
//!
//! A snapshot captures a tracked visit's confirmed state and transition log
//! so a session can be restored after the app restarts. Snapshots never
//! include an in-flight action: whatever was running is simply gone and the
//! restored visit starts with a free slot.

use crate::core::StateHistory;
use crate::orchestrator::TrackedVisit;
use crate::validation::{describe, validate_visit};
use crate::visit::{Visit, VisitStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;

pub mod error;

pub use error::SnapshotError;

/// Version identifier for the snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisitSnapshot {
    /// Snapshot format version
    pub version: u32,

    /// Unique snapshot identifier
    pub id: String,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    /// Last confirmed visit
    pub visit: Visit,

    /// Confirmed status transitions so far
    pub log: StateHistory<VisitStatus>,
}

impl VisitSnapshot {
    pub fn capture(tracked: &TrackedVisit) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            visit: tracked.current(),
            log: tracked.history(),
        }
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_str(json)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.checked()
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self = bincode::deserialize(bytes)
            .map_err(|e| SnapshotError::DeserializationFailed(e.to_string()))?;
        snapshot.checked()
    }

    fn checked(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }

    /// Rebuild a tracked visit. The visit is re-validated first.
    pub fn restore(self) -> Result<TrackedVisit, SnapshotError> {
        let snapshot = self.checked()?;
        if let Validation::Failure(violations) = validate_visit(&snapshot.visit) {
            return Err(SnapshotError::ValidationFailed(describe(&violations)));
        }
        Ok(TrackedVisit::with_history(snapshot.visit, snapshot.log))
    }
}
