//! # tripmap
//!
//! Core of a live, interactive travel map view.
//!
//! The crate owns a long-lived renderer instance, reconciles a changing set of
//! markers against it, samples and uploads the device position on a
//! cancellable loop, and drives a snap-to-position bottom panel from pointer
//! input. Rendering, geolocation and uploads sit behind traits so the core
//! runs the same against a browser map, a native renderer or the headless
//! scene used in tests.

pub mod core;
pub mod input;
pub mod layers;
pub mod location;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod view;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::MapViewConfig,
    engine::{EngineHandle, MapEngine},
    geo::{is_valid_coordinate, LatLng},
    session::Session,
};

pub use layers::{
    marker::{Marker, MarkerIcon, MarkerVariant},
    reconciler::{MarkerOp, MarkerReconciler, MarkerSet, ReconcilePlan},
    registry::{MarkerKey, MarkerRegistry, RenderedMarkerEntry},
};

pub use input::{
    events::PointerEvent,
    panel::{PanelGestureController, PanelOutcome, PanelState},
};

pub use location::{
    LocationError, LocationSample, LocationSink, LocationTracker, PositionProvider,
};

pub use rendering::{backend::RenderBackend, headless::HeadlessBackend};

pub use view::{LiveMapView, MapNotice, ViewPlatform};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("No async runtime available: {0}")]
    Runtime(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Initialises `env_logger` from `RUST_LOG`; later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}
