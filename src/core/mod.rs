pub mod config;
pub mod constants;
pub mod engine;
pub mod geo;
pub mod session;

pub use config::{MapSettings, MapViewConfig, PanelConfig, TrackerConfig};
pub use engine::{ApplyReport, ClickHandler, EngineHandle, MapEngine};
pub use geo::{is_valid_coordinate, LatLng};
pub use session::Session;
