//! Headless simulation of the live map view.
//!
//! Mounts the view on the in-memory renderer, feeds it a few attractions and a
//! live guide, then walks a simulated tourist around for a handful of ticks.

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::info;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tripmap::prelude::*;

/// Walks a fixed loop of waypoints, one per request.
struct SimulatedWalk {
    route: Vec<LatLng>,
    step: AtomicUsize,
}

#[async_trait]
impl PositionProvider for SimulatedWalk {
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> std::result::Result<LocationSample, LocationError> {
        if self.route.is_empty() {
            return Err(LocationError::PositionUnavailable);
        }
        let step = self.step.fetch_add(1, Ordering::SeqCst);
        let point = self.route[step % self.route.len()];
        Ok(LocationSample::new(point.lat, point.lng))
    }
}

/// Logs uploads instead of sending them.
struct LogSink;

#[async_trait]
impl LocationSink for LogSink {
    async fn post_location(
        &self,
        user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> tripmap::Result<()> {
        info!("upload {} -> ({:.5}, {:.5})", user_id, latitude, longitude);
        Ok(())
    }
}

fn catalog() -> Vec<Marker> {
    vec![
        Marker::new("colosseum", LatLng::new(41.8902, 12.4922))
            .with_title("Colosseum")
            .with_variant(MarkerVariant::Attraction)
            .with_directions("https://maps.example/?to=41.8902,12.4922"),
        Marker::new("pantheon", LatLng::new(41.8986, 12.4769))
            .with_title("Pantheon")
            .with_variant(MarkerVariant::Attraction),
        Marker::new("gelato", LatLng::new(41.9000, 12.4830))
            .with_title("Gelateria")
            .with_popup("<em>Open until midnight</em>")
            .with_variant(MarkerVariant::Poi),
        Marker::new("", LatLng::new(41.8955, 12.4823))
            .with_user_id("guide-marco")
            .with_title("Marco (guide)")
            .with_variant(MarkerVariant::Guide)
            .live(true),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tripmap::init_logging();

    let config = MapViewConfig::from_json_str(
        r#"{
            "map": { "default_center": { "lat": 41.8967, "lng": 12.4822 }, "default_zoom": 14.0 },
            "tracker": { "interval_ms": 500 }
        }"#,
    )?;

    let route = vec![
        LatLng::new(41.8967, 12.4822),
        LatLng::new(41.8975, 12.4800),
        LatLng::new(41.8986, 12.4775),
        LatLng::new(41.8995, 12.4790),
    ];
    let backend = HeadlessBackend::new();
    let mut view = LiveMapView::new(
        config.clone(),
        ViewPlatform {
            backend: Box::new(backend.clone()),
            provider: Arc::new(SimulatedWalk {
                route: route.clone(),
                step: AtomicUsize::new(0),
            }),
            sink: Arc::new(LogSink),
            scroll_lock: None,
            runtime: None,
        },
        Session::new("tourist-demo"),
    );

    if view
        .mount(Some(&MapContainer::new("map", 390.0, 844.0)), None, None)
        .is_none()
    {
        bail!("headless renderer refused to mount");
    }
    view.on_map_click(|point| info!("map clicked at {}", point));

    // The guide feed delivers a malformed position; it is skipped, not fatal.
    let mut markers = catalog();
    markers.push(
        Marker::new("", LatLng::new(f64::NAN, 12.0))
            .with_user_id("guide-broken")
            .with_variant(MarkerVariant::Guide),
    );
    let plan = view.set_markers(markers);
    info!(
        "initial render: {} ops, {} rejected",
        plan.ops.len(),
        plan.rejected.len()
    );

    view.start_tracking().map_err(anyhow::Error::msg)?;
    let mut last: Option<LatLng> = None;
    for _ in 0..route.len() {
        tokio::time::sleep(config.tracker.interval()).await;
        view.pump();
        if let Some(me) = view.engine().registry().self_marker() {
            let here = me.marker.position;
            if let Some(prev) = last {
                info!("walked {:.0} m to {}", prev.distance_to(&here), here);
            }
            last = Some(here);
        }
    }
    view.stop_tracking();

    view.dispatch_click(LatLng::new(41.8902, 12.4922));
    view.handle_pointer(PointerEvent::down_on_handle(780.0));
    view.handle_pointer(PointerEvent::move_to(500.0));
    if let PanelOutcome::Snapped { height, open } = view.handle_pointer(PointerEvent::up_at(500.0))
    {
        info!("panel snapped to {}px (open: {})", height, open);
    }

    {
        let scene = backend.scene();
        info!(
            "scene: {} markers, {} creates, {} updates, {} removes",
            scene.markers.len(),
            scene.creates,
            scene.updates,
            scene.removes
        );
        for title in scene.marker_titles().into_iter().flatten() {
            info!("  - {}", title);
        }
    }

    view.unmount();
    info!("destroyed scene {} time(s)", backend.scene().destroy_calls);
    Ok(())
}
