use crate::core::geo::LatLng;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};

/// Why a device-location request did not produce a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location request timed out")]
    Timeout,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("geolocation is not supported on this device")]
    Unsupported,
}

/// One device-location reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub latitude: f64,
    pub longitude: f64,
    pub captured_at: SystemTime,
}

impl LocationSample {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            captured_at: SystemTime::now(),
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

/// Source of device positions (platform geolocation, GPS, a simulator).
///
/// Implementations need not enforce `options.timeout`; the tracker bounds
/// every request itself.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<LocationSample, LocationError>;
}

/// Provider for platforms without geolocation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedProvider;

#[async_trait]
impl PositionProvider for UnsupportedProvider {
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<LocationSample, LocationError> {
        Err(LocationError::Unsupported)
    }
}
