//! In-memory renderer: keeps the scene as plain data so it can be inspected.

use crate::{
    core::geo::LatLng,
    layers::marker::{Marker, MarkerIcon},
    rendering::backend::{MapContainer, MarkerDraw, NativeMarkerId, RenderBackend},
    MapError, Result,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMarker {
    pub marker: Marker,
    pub icon: MarkerIcon,
    pub popup_html: String,
}

#[derive(Debug, Default)]
pub struct HeadlessScene {
    pub mounted_in: Option<String>,
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
    pub markers: BTreeMap<NativeMarkerId, HeadlessMarker>,
    pub creates: usize,
    pub updates: usize,
    pub removes: usize,
    pub destroy_calls: usize,
    next_id: u64,
}

impl HeadlessScene {
    pub fn is_mounted(&self) -> bool {
        self.mounted_in.is_some()
    }

    pub fn marker_titles(&self) -> Vec<Option<String>> {
        self.markers.values().map(|m| m.marker.title.clone()).collect()
    }
}

#[derive(Debug, Clone, Default)]
struct FailurePlan {
    create_scene: bool,
    marker_ops: bool,
}

/// Renderer double. Clones share one scene, so a test can keep a clone
/// after handing the backend to an engine.
#[derive(Debug, Clone, Default)]
pub struct HeadlessBackend {
    scene: Arc<Mutex<HeadlessScene>>,
    failures: Arc<Mutex<FailurePlan>>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `create_scene` calls fail.
    pub fn fail_scene_creation(&self, fail: bool) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.create_scene = fail;
        }
    }

    /// Makes marker add/update/remove calls fail.
    pub fn fail_marker_ops(&self, fail: bool) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.marker_ops = fail;
        }
    }

    pub fn scene(&self) -> MutexGuard<'_, HeadlessScene> {
        match self.scene.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn should_fail(&self, pick: impl Fn(&FailurePlan) -> bool) -> bool {
        self.failures.lock().map(|f| pick(&*f)).unwrap_or(false)
    }

    fn mounted_scene(&self) -> Result<MutexGuard<'_, HeadlessScene>> {
        let scene = self.scene();
        if !scene.is_mounted() {
            return Err(Box::new(MapError::Render("scene is not mounted".into())));
        }
        Ok(scene)
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_scene(&mut self, container: &MapContainer, center: LatLng, zoom: f64) -> Result<()> {
        if self.should_fail(|f| f.create_scene) {
            // Leave a half-built scene behind, as a real renderer might.
            self.scene().mounted_in = Some(container.element_id.clone());
            return Err(Box::new(MapError::Engine(format!(
                "renderer refused container '{}'",
                container.element_id
            ))));
        }
        let mut scene = self.scene();
        scene.mounted_in = Some(container.element_id.clone());
        scene.center = Some(center);
        scene.zoom = Some(zoom);
        Ok(())
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) -> Result<()> {
        let mut scene = self.mounted_scene()?;
        scene.center = Some(center);
        scene.zoom = Some(zoom);
        Ok(())
    }

    fn add_marker(&mut self, draw: MarkerDraw<'_>) -> Result<NativeMarkerId> {
        if self.should_fail(|f| f.marker_ops) {
            return Err(Box::new(MapError::Render("marker add failed".into())));
        }
        let mut scene = self.mounted_scene()?;
        scene.next_id += 1;
        let id = NativeMarkerId(scene.next_id);
        scene.markers.insert(
            id,
            HeadlessMarker {
                marker: draw.marker.clone(),
                icon: draw.icon.clone(),
                popup_html: draw.popup.to_html(),
            },
        );
        scene.creates += 1;
        Ok(id)
    }

    fn update_marker(&mut self, id: NativeMarkerId, draw: MarkerDraw<'_>) -> Result<()> {
        if self.should_fail(|f| f.marker_ops) {
            return Err(Box::new(MapError::Render("marker update failed".into())));
        }
        let mut scene = self.mounted_scene()?;
        let Some(native) = scene.markers.get_mut(&id) else {
            return Err(Box::new(MapError::Render(format!("unknown marker {:?}", id))));
        };
        native.marker = draw.marker.clone();
        native.icon = draw.icon.clone();
        native.popup_html = draw.popup.to_html();
        scene.updates += 1;
        Ok(())
    }

    fn remove_marker(&mut self, id: NativeMarkerId) -> Result<()> {
        if self.should_fail(|f| f.marker_ops) {
            return Err(Box::new(MapError::Render("marker remove failed".into())));
        }
        let mut scene = self.mounted_scene()?;
        scene.markers.remove(&id);
        scene.removes += 1;
        Ok(())
    }

    fn destroy_scene(&mut self) {
        let mut scene = self.scene();
        scene.mounted_in = None;
        scene.center = None;
        scene.zoom = None;
        scene.markers.clear();
        scene.destroy_calls += 1;
    }
}
