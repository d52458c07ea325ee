use std::sync::{Arc, Mutex};
use tripmap::prelude::*;

fn panel_with_log() -> (PanelGestureController, Arc<Mutex<Vec<bool>>>) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    let mut panel = PanelGestureController::new(PanelConfig::default());
    panel.on_toggle(Box::new(move |open| sink.lock().unwrap().push(open)));
    (panel, log)
}

#[test]
fn drag_past_threshold_snaps_open() {
    let (mut panel, log) = panel_with_log();
    assert_eq!(panel.height(), 80.0);

    panel.handle(PointerEvent::down_on_handle(700.0));
    assert_eq!(
        panel.handle(PointerEvent::move_to(440.0)),
        PanelOutcome::Resized { height: 340.0 }
    );
    assert_eq!(
        panel.handle(PointerEvent::up_at(440.0)),
        PanelOutcome::Snapped { height: 300.0, open: true }
    );

    assert_eq!(panel.height(), 300.0);
    assert!(panel.is_open());
    assert!(!panel.is_dragging());
    assert_eq!(*log.lock().unwrap(), vec![true]);
}

#[test]
fn short_drag_snaps_back_closed() {
    let (mut panel, log) = panel_with_log();

    panel.handle(PointerEvent::down_on_handle(700.0));
    panel.handle(PointerEvent::move_to(680.0));
    assert_eq!(panel.height(), 100.0);
    assert_eq!(
        panel.handle(PointerEvent::up_at(680.0)),
        PanelOutcome::Snapped { height: 80.0, open: false }
    );
    assert_eq!(*log.lock().unwrap(), vec![false]);
}

#[test]
fn threshold_is_exclusive() {
    let (mut panel, _log) = panel_with_log();

    // Exactly 150 above the closed baseline stays closed.
    panel.handle(PointerEvent::down_on_handle(700.0));
    panel.handle(PointerEvent::move_to(550.0));
    assert_eq!(panel.height(), 230.0);
    panel.handle(PointerEvent::up_at(550.0));
    assert!(!panel.is_open());

    panel.handle(PointerEvent::down_on_handle(700.0));
    panel.handle(PointerEvent::up_at(549.0));
    assert!(panel.is_open());
}

#[test]
fn dragging_down_from_open_closes() {
    let (mut panel, log) = panel_with_log();
    panel.set_open(true);

    panel.handle(PointerEvent::down_on_handle(400.0));
    panel.handle(PointerEvent::move_to(550.0));
    assert_eq!(panel.height(), 150.0);
    panel.handle(PointerEvent::up_at(550.0));

    assert_eq!(panel.height(), 80.0);
    assert_eq!(*log.lock().unwrap(), vec![true, false]);
}

#[test]
fn tap_on_open_handle_stays_open() {
    let (mut panel, _log) = panel_with_log();
    panel.set_open(true);

    panel.handle(PointerEvent::down_on_handle(400.0));
    panel.handle(PointerEvent::up_at(400.0));
    assert_eq!(panel.height(), 300.0);
    assert!(panel.is_open());
}

#[test]
fn second_drag_begin_is_ignored() {
    let (mut panel, _log) = panel_with_log();

    assert_eq!(
        panel.handle(PointerEvent::down_on_handle(700.0)),
        PanelOutcome::DragStarted
    );
    panel.handle(PointerEvent::move_to(600.0));
    assert_eq!(
        panel.handle(PointerEvent::down_on_handle(300.0)),
        PanelOutcome::Ignored
    );

    let state = panel.state();
    assert_eq!(state.drag_start_pointer_y, 700.0);
    assert_eq!(state.drag_start_height, 80.0);
    assert_eq!(state.height, 180.0);
}

#[test]
fn release_outside_handle_still_ends_drag() {
    let (mut panel, _log) = panel_with_log();

    panel.handle(PointerEvent::down_on_handle(700.0));
    panel.handle(PointerEvent::move_to(100.0).on(PointerTarget::Elsewhere));
    let outcome = panel.handle(PointerEvent::up_at(50.0).on(PointerTarget::Elsewhere));

    assert_eq!(outcome, PanelOutcome::Snapped { height: 300.0, open: true });
    assert!(!panel.is_dragging());
}

#[test]
fn stray_moves_and_releases_are_ignored() {
    let (mut panel, log) = panel_with_log();

    assert_eq!(panel.handle(PointerEvent::move_to(10.0)), PanelOutcome::Ignored);
    assert_eq!(panel.handle(PointerEvent::up_at(10.0)), PanelOutcome::Ignored);
    assert_eq!(panel.height(), 80.0);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn height_stays_within_bounds() {
    let config = PanelConfig {
        max_height: 360.0,
        ..PanelConfig::default()
    };
    let mut panel = PanelGestureController::new(config);

    panel.handle(PointerEvent::down_on_handle(700.0).touch(3));
    for y in [600.0, 100.0, -500.0, 2000.0, 650.0] {
        panel.handle(PointerEvent::move_to(y).touch(3));
        let height = panel.height();
        assert!((80.0..=360.0).contains(&height), "height {height} escaped bounds");
    }
    panel.handle(PointerEvent::cancel().touch(3));
    assert!((80.0..=360.0).contains(&panel.height()));
}
