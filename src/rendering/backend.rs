//! The seam between [`crate::core::engine::MapEngine`] and whatever actually
//! draws the map (a JS map library, a GPU renderer, the headless test scene).

use crate::{
    core::geo::LatLng,
    layers::{
        marker::{Marker, MarkerIcon},
        popup::PopupBody,
    },
    Result,
};

/// Opaque handle to a marker object owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeMarkerId(pub u64);

/// The element the map is mounted into.
#[derive(Debug, Clone, PartialEq)]
pub struct MapContainer {
    pub element_id: String,
    pub width: f64,
    pub height: f64,
}

impl MapContainer {
    pub fn new(element_id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            element_id: element_id.into(),
            width,
            height,
        }
    }

    /// A container without an id or without a positive size cannot host a map.
    pub fn is_usable(&self) -> bool {
        !self.element_id.is_empty()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Marker payload handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct MarkerDraw<'a> {
    pub marker: &'a Marker,
    pub icon: &'a MarkerIcon,
    pub popup: &'a PopupBody,
}

pub trait RenderBackend: Send {
    /// Builds the base scene. On error the engine calls [`Self::destroy_scene`]
    /// to release anything partially built.
    fn create_scene(&mut self, container: &MapContainer, center: LatLng, zoom: f64) -> Result<()>;

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()>;

    fn add_marker(&mut self, draw: MarkerDraw<'_>) -> Result<NativeMarkerId>;

    fn update_marker(&mut self, id: NativeMarkerId, draw: MarkerDraw<'_>) -> Result<()>;

    fn remove_marker(&mut self, id: NativeMarkerId) -> Result<()>;

    /// Tears the scene down. Must tolerate a scene that was never fully built.
    fn destroy_scene(&mut self);
}
