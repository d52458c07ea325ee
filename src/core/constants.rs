//! Core constants for the live map view.
//! Keeping them in a single place makes it easier to tweak view-wide magic numbers;
//! every one of them can be overridden through [`crate::core::config::MapViewConfig`].

/// Registry key reserved for the device's own position.
pub const SELF_LOCATION_KEY: &str = "userLocation";

/// Prefix for positional marker ids (`marker-<index>`).
pub const POSITIONAL_ID_PREFIX: &str = "marker-";

/// Period between location samples while tracking.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;

/// Upper bound on a single device-location acquisition.
pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 10_000;

/// Panel height when snapped open.
pub const PANEL_OPEN_HEIGHT: f64 = 300.0;

/// Panel height when snapped closed; also the drag baseline.
pub const PANEL_CLOSED_HEIGHT: f64 = 80.0;

/// Lower clamp for the live panel height.
pub const PANEL_MIN_HEIGHT: f64 = PANEL_CLOSED_HEIGHT;

/// Upper clamp for the live panel height.
pub const PANEL_MAX_HEIGHT: f64 = 480.0;

/// Distance above the closed baseline past which a released drag snaps open.
pub const PANEL_SNAP_THRESHOLD: f64 = 150.0;

/// Initial zoom when the host does not supply one.
pub const DEFAULT_ZOOM: f64 = 13.0;
