//! Configuration for the live map view
//!
//! Every knob has a default taken from [`crate::core::constants`]; a deployment
//! can override any subset of them from JSON.

use crate::{
    core::{
        constants::{
            DEFAULT_ACQUIRE_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_ZOOM,
            PANEL_CLOSED_HEIGHT, PANEL_MAX_HEIGHT, PANEL_MIN_HEIGHT, PANEL_OPEN_HEIGHT,
            PANEL_SNAP_THRESHOLD,
        },
        geo::LatLng,
    },
    MapError,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    pub map: MapSettings,
    pub tracker: TrackerConfig,
    pub panel: PanelConfig,
}

impl MapViewConfig {
    /// Parses a (possibly partial) JSON document and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self, MapError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MapError> {
        self.map.validate()?;
        self.tracker.validate()?;
        self.panel.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub default_center: LatLng,
    pub default_zoom: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            default_center: LatLng::default(),
            default_zoom: DEFAULT_ZOOM,
        }
    }
}

impl MapSettings {
    fn validate(&self) -> Result<(), MapError> {
        if !self.default_center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "default center {}",
                self.default_center
            )));
        }
        if !self.default_zoom.is_finite() || self.default_zoom < 0.0 {
            return Err(MapError::Config(format!(
                "default zoom {} must be a non-negative number",
                self.default_zoom
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub interval_ms: u64,
    pub acquire_timeout_ms: u64,
    pub high_accuracy: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
            high_accuracy: true,
        }
    }
}

impl TrackerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    fn validate(&self) -> Result<(), MapError> {
        if self.interval_ms == 0 {
            return Err(MapError::Config("tracker interval must be positive".into()));
        }
        if self.acquire_timeout_ms == 0 {
            return Err(MapError::Config(
                "acquisition timeout must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub min_height: f64,
    pub max_height: f64,
    pub open_height: f64,
    pub closed_height: f64,
    /// Measured upward from `closed_height`.
    pub snap_threshold: f64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            min_height: PANEL_MIN_HEIGHT,
            max_height: PANEL_MAX_HEIGHT,
            open_height: PANEL_OPEN_HEIGHT,
            closed_height: PANEL_CLOSED_HEIGHT,
            snap_threshold: PANEL_SNAP_THRESHOLD,
        }
    }
}

impl PanelConfig {
    /// Absolute height a released drag must exceed to snap open.
    pub fn snap_height(&self) -> f64 {
        self.closed_height + self.snap_threshold
    }

    pub fn clamp(&self, height: f64) -> f64 {
        height.clamp(self.min_height, self.max_height)
    }

    fn validate(&self) -> Result<(), MapError> {
        let heights = [
            self.min_height,
            self.max_height,
            self.open_height,
            self.closed_height,
            self.snap_threshold,
        ];
        if heights.iter().any(|h| !h.is_finite()) {
            return Err(MapError::Config("panel heights must be finite".into()));
        }
        if !(self.min_height <= self.closed_height
            && self.closed_height < self.open_height
            && self.open_height <= self.max_height)
        {
            return Err(MapError::Config(format!(
                "panel heights must satisfy min <= closed < open <= max (got {} / {} / {} / {})",
                self.min_height, self.closed_height, self.open_height, self.max_height
            )));
        }
        if self.snap_threshold < 0.0 {
            return Err(MapError::Config("snap threshold must not be negative".into()));
        }
        Ok(())
    }
}
