//! Owner of the single renderer instance behind a map view.
//!
//! The engine is a scoped resource: [`MapEngine::initialize`] acquires the
//! scene, [`MapEngine::dispose`] (or dropping the engine) releases it. Calls
//! made while no scene exists are no-ops.

use crate::{
    core::geo::LatLng,
    layers::{
        marker::{Marker, MarkerIcon},
        popup::PopupBody,
        reconciler::{MarkerOp, MarkerReconciler, MarkerSet, ReconcilePlan},
        registry::{MarkerKey, MarkerRegistry, RenderedMarkerEntry},
    },
    rendering::backend::{MapContainer, MarkerDraw, RenderBackend},
};
use log::{debug, error, warn};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Proof that a scene is mounted. Compare handles to tell instances apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle {
    id: u64,
}

impl EngineHandle {
    fn next() -> Self {
        Self {
            id: NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Process-unique id of the mounted scene.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Receives the geographic point of a map click.
pub type ClickHandler = Box<dyn FnMut(LatLng) + Send>;

/// Outcome of applying a batch of marker operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Operations the renderer accepted.
    pub applied: usize,
    /// Operations the renderer rejected; logged and skipped.
    pub failed: usize,
}

/// The single renderer instance behind a map view, plus what it has drawn.
pub struct MapEngine {
    backend: Box<dyn RenderBackend>,
    handle: Option<EngineHandle>,
    registry: MarkerRegistry,
    click_handler: Option<ClickHandler>,
    center: Option<LatLng>,
    zoom: Option<f64>,
}

impl MapEngine {
    /// Wraps `backend`; nothing is drawn until [`Self::initialize`].
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self {
            backend,
            handle: None,
            registry: MarkerRegistry::new(),
            click_handler: None,
            center: None,
            zoom: None,
        }
    }

    /// Mounts the scene. Returns the existing handle if already mounted, and
    /// `None` if the container is missing or the renderer fails.
    pub fn initialize(
        &mut self,
        container: Option<&MapContainer>,
        center: LatLng,
        zoom: f64,
    ) -> Option<EngineHandle> {
        if let Some(handle) = self.handle {
            return Some(handle);
        }

        let Some(container) = container else {
            warn!("Map container missing; map will not be rendered");
            return None;
        };
        if !container.is_usable() {
            warn!(
                "Map container '{}' is not usable ({}x{}); map will not be rendered",
                container.element_id, container.width, container.height
            );
            return None;
        }
        if !center.is_valid() || !zoom.is_finite() {
            warn!("Refusing to mount map at invalid view {} / {}", center, zoom);
            return None;
        }

        match self.backend.create_scene(container, center, zoom) {
            Ok(()) => {
                let handle = EngineHandle::next();
                debug!(
                    "Map engine {} mounted in '{}' at {} z{}",
                    handle.id, container.element_id, center, zoom
                );
                self.handle = Some(handle);
                self.center = Some(center);
                self.zoom = Some(zoom);
                Some(handle)
            }
            Err(e) => {
                error!("Map engine failed to initialize: {}", e);
                self.backend.destroy_scene();
                None
            }
        }
    }

    /// Handle of the mounted scene, if any.
    pub fn handle(&self) -> Option<EngineHandle> {
        self.handle
    }

    /// Whether a scene is currently mounted.
    pub fn is_initialized(&self) -> bool {
        self.handle.is_some()
    }

    /// Last centre applied to the scene.
    pub fn center(&self) -> Option<LatLng> {
        self.center
    }

    /// Last zoom applied to the scene.
    pub fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    /// Markers currently on screen.
    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    /// Moves the camera. Ignored without a scene or for an invalid view.
    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        if !self.check_mounted("set_view") {
            return;
        }
        if !center.is_valid() || !zoom.is_finite() {
            warn!("Ignoring invalid view {} / {}", center, zoom);
            return;
        }
        match self.backend.set_view(center, zoom) {
            Ok(()) => {
                self.center = Some(center);
                self.zoom = Some(zoom);
            }
            Err(e) => error!("Failed to set map view: {}", e),
        }
    }

    /// Re-centres without changing zoom.
    pub fn pan_to(&mut self, center: LatLng) {
        if let Some(zoom) = self.zoom {
            self.set_view(center, zoom);
        } else {
            self.check_mounted("pan_to");
        }
    }

    /// Replaces the click handler; only the latest registration is called.
    pub fn on_click(&mut self, handler: ClickHandler) {
        self.click_handler = Some(handler);
    }

    /// Drops the click handler; later clicks are ignored.
    pub fn clear_click_handler(&mut self) {
        self.click_handler = None;
    }

    /// Entry point for click events coming from the renderer.
    pub fn dispatch_click(&mut self, point: LatLng) -> bool {
        if !self.check_mounted("dispatch_click") {
            return false;
        }
        match self.click_handler.as_mut() {
            Some(handler) => {
                handler(point);
                true
            }
            None => false,
        }
    }

    /// Diffs `target` against what is on screen and applies the result.
    ///
    /// The returned plan lists the operations handed to the renderer. Without
    /// a mounted scene nothing is applied, so its `ops` are empty; rejected
    /// markers are still reported.
    pub fn reconcile(&mut self, target: &MarkerSet) -> ReconcilePlan {
        let mut plan = MarkerReconciler::reconcile(&self.registry, target);
        if !self.check_mounted("reconcile") {
            plan.ops.clear();
            return plan;
        }
        if !plan.is_empty() {
            let report = self.apply_marker_ops(&plan.ops);
            debug!(
                "Reconciled markers: {} applied, {} failed, {} rejected",
                report.applied,
                report.failed,
                plan.rejected.len()
            );
        }
        plan
    }

    /// Removes the self-location marker, if any.
    pub fn clear_self_marker(&mut self) {
        if let Some(op) = MarkerReconciler::clear_self(&self.registry) {
            self.apply_marker_ops(std::slice::from_ref(&op));
        }
    }

    /// Runs operations against the renderer. A failing operation is logged
    /// and does not stop the rest of the batch.
    pub fn apply_marker_ops(&mut self, ops: &[MarkerOp]) -> ApplyReport {
        let mut report = ApplyReport::default();
        if !self.check_mounted("apply_marker_ops") {
            return report;
        }

        for op in ops {
            let ok = match op {
                MarkerOp::Create { key, marker, icon } => self.create_marker(key, marker, icon),
                MarkerOp::Update { key, marker, icon } => self.update_marker(key, marker, icon),
                MarkerOp::Remove { key } => self.remove_marker(key),
            };
            if ok {
                report.applied += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    fn create_marker(&mut self, key: &MarkerKey, marker: &Marker, icon: &MarkerIcon) -> bool {
        if self.registry.contains(key) {
            // Stale plan: the key was created since the plan was computed.
            return self.update_marker(key, marker, icon);
        }
        let popup = PopupBody::from_marker(marker);
        let draw = MarkerDraw {
            marker,
            icon,
            popup: &popup,
        };
        match self.backend.add_marker(draw) {
            Ok(native) => {
                self.registry.insert(
                    key.clone(),
                    RenderedMarkerEntry {
                        marker: marker.clone(),
                        native,
                    },
                );
                true
            }
            Err(e) => {
                error!("Failed to create marker '{}': {}", key, e);
                false
            }
        }
    }

    fn update_marker(&mut self, key: &MarkerKey, marker: &Marker, icon: &MarkerIcon) -> bool {
        let Some(native) = self.registry.get(key).map(|entry| entry.native) else {
            return self.create_marker(key, marker, icon);
        };
        let popup = PopupBody::from_marker(marker);
        let draw = MarkerDraw {
            marker,
            icon,
            popup: &popup,
        };
        match self.backend.update_marker(native, draw) {
            Ok(()) => {
                self.registry.insert(
                    key.clone(),
                    RenderedMarkerEntry {
                        marker: marker.clone(),
                        native,
                    },
                );
                true
            }
            Err(e) => {
                error!("Failed to update marker '{}': {}", key, e);
                false
            }
        }
    }

    fn remove_marker(&mut self, key: &MarkerKey) -> bool {
        let Some(entry) = self.registry.remove(key) else {
            return true;
        };
        match self.backend.remove_marker(entry.native) {
            Ok(()) => true,
            Err(e) => {
                error!("Failed to remove marker '{}': {}", key, e);
                false
            }
        }
    }

    /// Releases the scene. Safe to call any number of times.
    pub fn dispose(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let dropped = self.registry.drain().len();
        self.click_handler = None;
        self.center = None;
        self.zoom = None;
        self.backend.destroy_scene();
        debug!("Map engine {} disposed ({} markers dropped)", handle.id, dropped);
    }

    fn check_mounted(&self, operation: &str) -> bool {
        if self.handle.is_some() {
            return true;
        }
        if cfg!(debug_assertions) {
            warn!("MapEngine::{} called without a mounted scene; ignored", operation);
        }
        false
    }
}

impl Drop for MapEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
