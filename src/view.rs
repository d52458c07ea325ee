//! The live map view a hosting page embeds.
//!
//! `LiveMapView` owns the engine, the panel controller and the tracker. All
//! marker and panel mutation happens on the caller's thread: tracker results
//! arrive over a channel and are applied by [`LiveMapView::pump`].

use crate::{
    core::{
        config::MapViewConfig,
        engine::{EngineHandle, MapEngine},
        geo::LatLng,
        session::Session,
    },
    input::{
        events::PointerEvent,
        panel::{PanelGestureController, PanelOutcome, ScrollLock, ToggleHandler},
    },
    layers::{
        marker::Marker,
        reconciler::{MarkerSet, ReconcilePlan},
    },
    location::{
        LocationError, LocationSample, LocationSink, LocationTracker, PositionProvider,
        TrackerObserver,
    },
    rendering::backend::{MapContainer, RenderBackend},
};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Side-channel messages meant for toast-style display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapNotice {
    /// A location request (periodic or one-off) failed.
    LocationFailed(LocationError),
    /// The renderer could not be mounted; the map stays blank.
    MapUnavailable,
    /// Live tracking could not start because no async runtime was reachable.
    TrackingUnavailable,
}

#[derive(Debug)]
enum TrackerEvent {
    Sample { generation: u64, sample: LocationSample },
    Failed { generation: u64, error: LocationError },
}

impl TrackerEvent {
    fn generation(&self) -> u64 {
        match self {
            TrackerEvent::Sample { generation, .. } | TrackerEvent::Failed { generation, .. } => {
                *generation
            }
        }
    }
}

struct ChannelObserver {
    tx: Sender<TrackerEvent>,
}

impl TrackerObserver for ChannelObserver {
    fn on_sample(&self, generation: u64, sample: &LocationSample) {
        let _ = self.tx.send(TrackerEvent::Sample {
            generation,
            sample: *sample,
        });
    }

    fn on_error(&self, generation: u64, error: &LocationError) {
        let _ = self.tx.send(TrackerEvent::Failed {
            generation,
            error: *error,
        });
    }
}

/// Everything the view needs from the platform.
pub struct ViewPlatform {
    pub backend: Box<dyn RenderBackend>,
    pub provider: Arc<dyn PositionProvider>,
    pub sink: Arc<dyn LocationSink>,
    pub scroll_lock: Option<Box<dyn ScrollLock>>,
    /// Runtime for the location loop. Needed when the view lives on a thread
    /// outside tokio; otherwise the caller's runtime is used.
    pub runtime: Option<Handle>,
}

pub struct LiveMapView {
    config: MapViewConfig,
    engine: MapEngine,
    panel: PanelGestureController,
    tracker: LocationTracker,
    tracker_rx: Receiver<TrackerEvent>,
    notices_tx: Sender<MapNotice>,
    notices_rx: Receiver<MapNotice>,
    target: MarkerSet,
}

impl LiveMapView {
    pub fn new(config: MapViewConfig, platform: ViewPlatform, session: Session) -> Self {
        let (tracker_tx, tracker_rx) = unbounded();
        let (notices_tx, notices_rx) = unbounded();

        let mut tracker = LocationTracker::with_observer(
            platform.provider,
            platform.sink,
            session,
            config.tracker.clone(),
            Arc::new(ChannelObserver { tx: tracker_tx }),
        );
        if let Some(handle) = platform.runtime {
            tracker = tracker.with_runtime(handle);
        }
        let panel = match platform.scroll_lock {
            Some(lock) => PanelGestureController::with_scroll_lock(config.panel.clone(), lock),
            None => PanelGestureController::new(config.panel.clone()),
        };

        Self {
            engine: MapEngine::new(platform.backend),
            panel,
            tracker,
            tracker_rx,
            notices_tx,
            notices_rx,
            target: MarkerSet::default(),
            config,
        }
    }

    /// Mounts the map; falls back to the configured default view. On failure
    /// the rest of the view keeps working and a notice is posted.
    pub fn mount(
        &mut self,
        container: Option<&MapContainer>,
        center: Option<LatLng>,
        zoom: Option<f64>,
    ) -> Option<EngineHandle> {
        let center = center.unwrap_or(self.config.map.default_center);
        let zoom = zoom.unwrap_or(self.config.map.default_zoom);

        let handle = self.engine.initialize(container, center, zoom);
        match handle {
            Some(_) => {
                self.engine.reconcile(&self.target);
            }
            None => self.notify(MapNotice::MapUnavailable),
        }
        handle
    }

    /// Stops tracking and releases the map. Idempotent.
    pub fn unmount(&mut self) {
        self.tracker.stop_periodic();
        self.discard_pending();
        self.engine.dispose();
    }

    /// Replaces the ordinary markers; the self-location marker is kept.
    pub fn set_markers(&mut self, markers: Vec<Marker>) -> ReconcilePlan {
        self.target.markers = markers;
        self.engine.reconcile(&self.target)
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.engine.set_view(center, zoom);
    }

    pub fn on_map_click(&mut self, handler: impl FnMut(LatLng) + Send + 'static) {
        self.engine.on_click(Box::new(handler));
    }

    /// Forwards a click reported by the renderer.
    pub fn dispatch_click(&mut self, point: LatLng) -> bool {
        self.engine.dispatch_click(point)
    }

    pub fn on_panel_toggle(&mut self, handler: ToggleHandler) {
        self.panel.on_toggle(handler);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> PanelOutcome {
        self.panel.handle(event)
    }

    /// Starts the periodic location loop. On failure the map stays static
    /// and a [`MapNotice::TrackingUnavailable`] is posted.
    pub fn start_tracking(&mut self) -> crate::Result<()> {
        info!("Starting live location for {}", self.tracker.session().user_id);
        let started = self.tracker.start_periodic();
        if started.is_err() {
            self.discard_pending();
            self.notify(MapNotice::TrackingUnavailable);
        }
        started
    }

    pub fn stop_tracking(&mut self) {
        self.tracker.stop_periodic();
        self.discard_pending();
    }

    pub fn is_tracking(&self) -> bool {
        self.tracker.is_running()
    }

    /// Single "locate me" request: re-centres and moves the self marker, or
    /// posts a notice on failure.
    pub async fn locate_once(&mut self) -> Result<LocationSample, LocationError> {
        match self.tracker.get_once().await {
            Ok(sample) => {
                self.apply_sample(&sample);
                Ok(sample)
            }
            Err(error) => {
                self.notify(MapNotice::LocationFailed(error));
                Err(error)
            }
        }
    }

    /// Applies tracker results that arrived since the last call. Results from
    /// a stopped or restarted loop are dropped. Returns how many were applied.
    pub fn pump(&mut self) -> usize {
        let current = self.tracker.generation();
        let mut applied = 0;
        while let Ok(event) = self.tracker_rx.try_recv() {
            if event.generation() != current {
                debug!("Dropping tracker event from generation {}", event.generation());
                continue;
            }
            match event {
                TrackerEvent::Sample { sample, .. } => {
                    self.apply_sample(&sample);
                    applied += 1;
                }
                TrackerEvent::Failed { error, .. } => {
                    self.notify(MapNotice::LocationFailed(error));
                }
            }
        }
        applied
    }

    /// Removes the self-location marker from the map.
    pub fn clear_self_marker(&mut self) {
        self.target.self_marker = None;
        self.engine.clear_self_marker();
    }

    /// Receiver for toast-style notices; clones share one queue.
    pub fn notices(&self) -> Receiver<MapNotice> {
        self.notices_rx.clone()
    }

    pub fn engine(&self) -> &MapEngine {
        &self.engine
    }

    pub fn panel(&self) -> &PanelGestureController {
        &self.panel
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    pub fn config(&self) -> &MapViewConfig {
        &self.config
    }

    fn apply_sample(&mut self, sample: &LocationSample) {
        self.engine.pan_to(sample.position());
        self.target.self_marker = Some(Marker::self_location(sample));
        self.engine.reconcile(&self.target);
    }

    fn discard_pending(&mut self) {
        let dropped = self.tracker_rx.try_iter().count();
        if dropped > 0 {
            debug!("Discarded {} pending tracker events", dropped);
        }
    }

    fn notify(&self, notice: MapNotice) {
        let _ = self.notices_tx.send(notice);
    }
}

impl Drop for LiveMapView {
    fn drop(&mut self) {
        self.unmount();
    }
}
