//! Device location collaborator.

use crate::visit::Coordinates;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Why a location could not be obtained.
///
/// Messages are shown to the caregiver verbatim.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationError {
    #[error("Geolocation is not supported by this device.")]
    Unsupported,

    #[error("Location permission denied. Please enable location access in your device settings.")]
    PermissionDenied,

    #[error("Location information is unavailable. Please try again later.")]
    PositionUnavailable,

    #[error("Location request timed out. Please try again.")]
    Timeout,
}

/// Supplies the device's current coordinates.
///
/// Implementations wrap the platform geolocation API. They do not need to
/// enforce a deadline themselves; [`acquire_location`] bounds every call.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_location(&self) -> Result<Coordinates, LocationError>;
}

#[async_trait]
impl<P: LocationProvider + ?Sized> LocationProvider for std::sync::Arc<P> {
    async fn current_location(&self) -> Result<Coordinates, LocationError> {
        (**self).current_location().await
    }
}

/// Ask `provider` for a reading, giving up after `timeout`.
///
/// A reading outside the valid coordinate ranges is reported as
/// [`LocationError::PositionUnavailable`].
pub async fn acquire_location<P>(provider: &P, timeout: Duration) -> Result<Coordinates, LocationError>
where
    P: LocationProvider + ?Sized,
{
    let coordinates = tokio::time::timeout(timeout, provider.current_location())
        .await
        .map_err(|_| LocationError::Timeout)??;

    if !coordinates.is_valid() {
        return Err(LocationError::PositionUnavailable);
    }
    Ok(coordinates)
}
