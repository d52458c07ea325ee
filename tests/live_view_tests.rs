mod common;

use common::{container, marker, FixedProvider, RecordingSink};
use std::sync::Mutex;
use tokio::time::sleep;
use tripmap::constants::DEFAULT_POLL_INTERVAL_MS;
use tripmap::prelude::*;

fn interval() -> Duration {
    Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
}

fn view_with(
    provider: impl PositionProvider + 'static,
) -> (LiveMapView, HeadlessBackend, Arc<RecordingSink>) {
    let backend = HeadlessBackend::new();
    let sink = Arc::new(RecordingSink::default());
    let view = LiveMapView::new(
        MapViewConfig::default(),
        ViewPlatform {
            backend: Box::new(backend.clone()),
            provider: Arc::new(provider),
            sink: sink.clone(),
            scroll_lock: None,
            runtime: None,
        },
        Session::new("tourist-9"),
    );
    (view, backend, sink)
}

#[tokio::test(start_paused = true)]
async fn tracking_recenters_and_places_self_marker() {
    let (mut view, backend, sink) = view_with(FixedProvider::at(41.9, 12.5));
    view.mount(Some(&container()), Some(LatLng::new(41.0, 12.0)), Some(13.0))
        .expect("mounts");
    view.set_markers(vec![marker("pantheon", 41.8986, 12.4769)]);

    view.start_tracking().expect("inside a runtime");
    sleep(interval() + Duration::from_millis(100)).await;
    assert_eq!(view.pump(), 1);

    assert_eq!(sink.upload_count(), 1);
    assert_eq!(backend.scene().center, Some(LatLng::new(41.9, 12.5)));
    let registry = view.engine().registry();
    assert_eq!(registry.ordinary_len(), 1);
    let me = registry.self_marker().expect("self marker placed");
    assert_eq!(me.marker.variant, MarkerVariant::User);
    assert!(me.marker.is_live);

    // Replacing the ordinary markers leaves the self marker alone.
    view.set_markers(vec![marker("trevi", 41.9009, 12.4833)]);
    assert!(view.engine().registry().self_marker().is_some());
    assert_eq!(backend.scene().markers.len(), 2);

    view.stop_tracking();
    assert!(!view.is_tracking());
}

#[tokio::test(start_paused = true)]
async fn samples_from_a_previous_run_are_dropped() {
    let (mut view, _backend, _sink) = view_with(FixedProvider::at(41.9, 12.5));
    view.mount(Some(&container()), None, None);

    view.start_tracking().expect("inside a runtime");
    sleep(interval() + Duration::from_millis(100)).await;
    // Restarting bumps the generation before the queued sample is applied.
    view.start_tracking().expect("inside a runtime");
    assert_eq!(view.pump(), 0);
    assert!(view.engine().registry().self_marker().is_none());
}

#[tokio::test(start_paused = true)]
async fn nothing_applied_after_stop() {
    let (mut view, _backend, sink) = view_with(FixedProvider::at(41.9, 12.5));
    view.mount(Some(&container()), None, None);

    view.start_tracking().expect("inside a runtime");
    sleep(interval() + Duration::from_millis(100)).await;
    view.stop_tracking();
    sleep(interval() * 3).await;

    assert_eq!(view.pump(), 0);
    assert_eq!(sink.upload_count(), 1);
    assert!(view.engine().registry().self_marker().is_none());
}

#[tokio::test(start_paused = true)]
async fn tick_failures_become_notices() {
    let (mut view, _backend, _sink) =
        view_with(FixedProvider::failing(LocationError::PermissionDenied));
    view.mount(Some(&container()), None, None);
    let notices = view.notices();

    view.start_tracking().expect("inside a runtime");
    sleep(interval() * 2 + Duration::from_millis(100)).await;
    view.pump();

    let received: Vec<MapNotice> = notices.try_iter().collect();
    assert_eq!(
        received,
        vec![
            MapNotice::LocationFailed(LocationError::PermissionDenied),
            MapNotice::LocationFailed(LocationError::PermissionDenied),
        ]
    );
    assert!(view.is_tracking());
}

#[tokio::test]
async fn locate_once_success_and_failure() {
    let (mut view, backend, sink) = view_with(FixedProvider::at(35.68, 139.76));
    view.mount(Some(&container()), None, None);

    let sample = view.locate_once().await.expect("position available");
    assert_eq!(sample.position(), LatLng::new(35.68, 139.76));
    assert_eq!(backend.scene().center, Some(sample.position()));
    assert!(view.engine().registry().self_marker().is_some());
    // A one-off locate does not upload.
    assert_eq!(sink.upload_count(), 0);

    let (mut denied, _backend, _sink) =
        view_with(FixedProvider::failing(LocationError::PermissionDenied));
    denied.mount(Some(&container()), None, None);
    assert_eq!(
        denied.locate_once().await,
        Err(LocationError::PermissionDenied)
    );
    assert_eq!(
        denied.notices().try_recv().ok(),
        Some(MapNotice::LocationFailed(LocationError::PermissionDenied))
    );
}

#[test]
fn failed_mount_degrades_gracefully() {
    let (mut view, backend, _sink) = view_with(FixedProvider::at(1.0, 1.0));

    assert!(view.mount(None, None, None).is_none());
    assert_eq!(view.notices().try_recv().ok(), Some(MapNotice::MapUnavailable));

    let plan = view.set_markers(vec![marker("a", 1.0, 1.0)]);
    assert!(plan.ops.is_empty());
    assert!(view.engine().registry().is_empty());
    assert!(!backend.scene().is_mounted());

    // The panel is independent of the map.
    view.handle_pointer(PointerEvent::down_on_handle(700.0));
    view.handle_pointer(PointerEvent::up_at(300.0));
    assert!(view.panel().is_open());
}

#[test]
fn tracking_without_a_runtime_degrades_to_a_notice() {
    let (mut view, _backend, _sink) = view_with(FixedProvider::at(1.0, 1.0));
    view.mount(Some(&container()), None, None);
    let notices = view.notices();

    assert!(view.start_tracking().is_err());
    assert!(!view.is_tracking());
    assert_eq!(notices.try_recv().ok(), Some(MapNotice::TrackingUnavailable));

    // The rest of the view keeps working.
    view.set_markers(vec![marker("a", 1.0, 1.0)]);
    assert_eq!(view.engine().registry().ordinary_len(), 1);
}

#[test]
fn tracking_from_a_plain_thread_with_a_supplied_runtime() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let backend = HeadlessBackend::new();
    let mut view = LiveMapView::new(
        MapViewConfig::from_json_str(r#"{ "tracker": { "interval_ms": 20 } }"#).unwrap(),
        ViewPlatform {
            backend: Box::new(backend.clone()),
            provider: Arc::new(FixedProvider::at(41.9, 12.5)),
            sink: Arc::new(RecordingSink::default()),
            scroll_lock: None,
            runtime: Some(rt.handle().clone()),
        },
        Session::new("tourist-9"),
    );
    view.mount(Some(&container()), None, None);

    view.start_tracking().expect("runs on the supplied runtime");
    assert!(view.is_tracking());

    let mut applied = 0;
    for _ in 0..250 {
        applied += view.pump();
        if applied > 0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(applied > 0);
    assert!(view.engine().registry().self_marker().is_some());

    view.stop_tracking();
    assert!(!view.is_tracking());
}

#[test]
fn markers_supplied_before_mount_render_on_mount() {
    let (mut view, backend, _sink) = view_with(FixedProvider::at(1.0, 1.0));
    view.set_markers(vec![marker("a", 1.0, 1.0), marker("b", 2.0, 2.0)]);
    assert_eq!(backend.scene().markers.len(), 0);

    view.mount(Some(&container()), None, None);
    assert_eq!(backend.scene().markers.len(), 2);
}

#[test]
fn clicks_and_panel_toggles_reach_the_host() {
    let (mut view, _backend, _sink) = view_with(FixedProvider::at(1.0, 1.0));
    view.mount(Some(&container()), None, None);

    let clicks = Arc::new(Mutex::new(Vec::new()));
    let clicks_sink = clicks.clone();
    view.on_map_click(move |point| clicks_sink.lock().unwrap().push(point));

    let toggles = Arc::new(Mutex::new(Vec::new()));
    let toggles_sink = toggles.clone();
    view.on_panel_toggle(Box::new(move |open| toggles_sink.lock().unwrap().push(open)));

    assert!(view.dispatch_click(LatLng::new(48.0, 2.0)));
    view.handle_pointer(PointerEvent::down_on_handle(700.0));
    view.handle_pointer(PointerEvent::move_to(400.0));
    view.handle_pointer(PointerEvent::up_at(400.0));

    assert_eq!(*clicks.lock().unwrap(), vec![LatLng::new(48.0, 2.0)]);
    assert_eq!(*toggles.lock().unwrap(), vec![true]);
}

#[test]
fn unmount_releases_scene_once() {
    let (mut view, backend, _sink) = view_with(FixedProvider::at(1.0, 1.0));
    view.mount(Some(&container()), None, None);
    view.set_markers(vec![marker("a", 1.0, 1.0)]);

    view.unmount();
    view.unmount();
    drop(view);

    assert_eq!(backend.scene().destroy_calls, 1);
    assert!(!backend.scene().is_mounted());
}
