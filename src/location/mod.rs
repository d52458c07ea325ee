pub mod provider;
pub mod sink;
pub mod tracker;

pub use provider::{
    LocationError, LocationSample, PositionOptions, PositionProvider, UnsupportedProvider,
};
pub use sink::{LocationSink, RestLocationSink};
pub use tracker::{LocationTracker, TrackerObserver};
