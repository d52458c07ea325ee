//! Prelude module for common tripmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use tripmap::prelude::*;`

pub use crate::core::{
    config::{MapSettings, MapViewConfig, PanelConfig, TrackerConfig},
    engine::{ApplyReport, EngineHandle, MapEngine},
    geo::{is_valid_coordinate, LatLng},
    session::Session,
};

pub use crate::layers::{
    marker::{Marker, MarkerIcon, MarkerVariant},
    popup::PopupBody,
    reconciler::{MarkerOp, MarkerReconciler, MarkerSet, ReconcilePlan, RejectReason},
    registry::{MarkerKey, MarkerRegistry, RenderedMarkerEntry},
};

pub use crate::input::{
    events::{PointerEvent, PointerPhase, PointerSource, PointerTarget},
    panel::{NoScrollLock, PanelGestureController, PanelOutcome, PanelState, ScrollLock},
};

pub use crate::location::{
    LocationError, LocationSample, LocationSink, LocationTracker, PositionOptions,
    PositionProvider, RestLocationSink, TrackerObserver, UnsupportedProvider,
};

pub use crate::rendering::{
    backend::{MapContainer, MarkerDraw, NativeMarkerId, RenderBackend},
    headless::{HeadlessBackend, HeadlessScene},
};

pub use crate::runtime::{spawn, AsyncHandle, AsyncSpawner, TokioSpawner};

pub use crate::view::{LiveMapView, MapNotice, ViewPlatform};

pub use crate::{Error as MapError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
