//! The capture pipeline's error taxonomy.
//!
//! Every failure in the acquisition pipeline maps to exactly one of these
//! kinds; the view never stays pending on an error. Use `user_message()`
//! for a UI-appropriate message.

use thiserror::Error;

use crate::types::{GeocodeError, SensorError, StoreError};

/// Everything that can take the view to the Failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("position acquisition timed out")]
    Timeout,

    #[error("no positioning capability on this host")]
    Unsupported,

    #[error("address lookup failed")]
    NetworkFailure,

    #[error("captured location could not be stored")]
    StorageFailure,
}

impl CaptureError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            CaptureError::PermissionDenied => "Location access denied.",
            CaptureError::PositionUnavailable => "Location unavailable.",
            CaptureError::Timeout => "Failed to fetch location.",
            CaptureError::Unsupported => "Geolocation is not supported by your browser.",
            CaptureError::NetworkFailure => {
                "Address lookup failed. Check your internet connection."
            }
            CaptureError::StorageFailure => "Could not save your location. Please try again.",
        }
    }
}

impl From<SensorError> for CaptureError {
    fn from(e: SensorError) -> Self {
        match e {
            SensorError::PermissionDenied => CaptureError::PermissionDenied,
            SensorError::PositionUnavailable => CaptureError::PositionUnavailable,
            SensorError::Timeout => CaptureError::Timeout,
            SensorError::Unsupported => CaptureError::Unsupported,
        }
    }
}

impl From<GeocodeError> for CaptureError {
    fn from(_: GeocodeError) -> Self {
        CaptureError::NetworkFailure
    }
}

impl From<StoreError> for CaptureError {
    fn from(_: StoreError) -> Self {
        CaptureError::StorageFailure
    }
}
