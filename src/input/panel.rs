//! Drag handle -> bottom panel height, with open/closed snapping on release.
//!
//! A drag is owned by one [`GestureSession`] from pointer-down on the handle
//! to the matching release. While it lives, the session captures every event
//! of its pointer no matter which element it lands on, so a fast drag that
//! leaves the handle still ends cleanly.

use crate::{
    core::config::PanelConfig,
    input::events::{PointerEvent, PointerPhase, PointerTarget},
};
use instant::Instant;
use log::debug;

/// Page-scroll suppression while a drag is in progress.
pub trait ScrollLock: Send {
    fn lock(&mut self);
    fn unlock(&mut self);
}

/// For hosts without page scroll.
#[derive(Debug, Default)]
pub struct NoScrollLock;

impl ScrollLock for NoScrollLock {
    fn lock(&mut self) {}
    fn unlock(&mut self) {}
}

/// Receives `true` when the panel snaps open and `false` when it snaps closed.
pub type ToggleHandler = Box<dyn FnMut(bool) + Send>;

/// Snapshot of the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelState {
    pub height: f64,
    pub drag_start_pointer_y: f64,
    pub drag_start_height: f64,
    pub is_dragging: bool,
}

/// Result of feeding one event to the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelOutcome {
    Ignored,
    DragStarted,
    Resized { height: f64 },
    Snapped { height: f64, open: bool },
}

#[derive(Debug, Clone, Copy)]
pub struct GestureSession {
    pointer_id: u64,
    start_pointer_y: f64,
    start_height: f64,
    candidate_height: f64,
    started_at: Instant,
}

impl GestureSession {
    fn begin(event: &PointerEvent, height: f64) -> Self {
        Self {
            pointer_id: event.pointer_id,
            start_pointer_y: event.y,
            start_height: height,
            candidate_height: height,
            started_at: Instant::now(),
        }
    }

    /// The session sees every event of its own pointer, wherever it lands.
    fn captures(&self, event: &PointerEvent) -> bool {
        event.pointer_id == self.pointer_id
    }

    fn track(&mut self, pointer_y: f64, config: &PanelConfig) -> f64 {
        if pointer_y.is_finite() {
            let delta = self.start_pointer_y - pointer_y;
            self.candidate_height = config.clamp(self.start_height + delta);
        }
        self.candidate_height
    }
}

enum Phase {
    Resting,
    Dragging(GestureSession),
}

pub struct PanelGestureController {
    config: PanelConfig,
    height: f64,
    open: bool,
    phase: Phase,
    scroll_lock: Box<dyn ScrollLock>,
    on_toggle: Option<ToggleHandler>,
}

impl PanelGestureController {
    pub fn new(config: PanelConfig) -> Self {
        Self::with_scroll_lock(config, Box::new(NoScrollLock))
    }

    pub fn with_scroll_lock(config: PanelConfig, scroll_lock: Box<dyn ScrollLock>) -> Self {
        let height = config.clamp(config.closed_height);
        Self {
            config,
            height,
            open: false,
            phase: Phase::Resting,
            scroll_lock,
            on_toggle: None,
        }
    }

    pub fn on_toggle(&mut self, handler: ToggleHandler) {
        self.on_toggle = Some(handler);
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn state(&self) -> PanelState {
        match &self.phase {
            Phase::Resting => PanelState {
                height: self.height,
                drag_start_pointer_y: 0.0,
                drag_start_height: self.height,
                is_dragging: false,
            },
            Phase::Dragging(session) => PanelState {
                height: self.height,
                drag_start_pointer_y: session.start_pointer_y,
                drag_start_height: session.start_height,
                is_dragging: true,
            },
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> PanelOutcome {
        match event.phase {
            PointerPhase::Down => self.begin(&event),
            PointerPhase::Move => self.drag(&event),
            PointerPhase::Up | PointerPhase::Cancel => self.end(&event),
        }
    }

    /// Snaps without a gesture. Ignored while a drag is in progress.
    pub fn set_open(&mut self, open: bool) -> PanelOutcome {
        if self.is_dragging() {
            return PanelOutcome::Ignored;
        }
        self.snap(open)
    }

    fn begin(&mut self, event: &PointerEvent) -> PanelOutcome {
        if self.is_dragging() || event.target != PointerTarget::Handle || !event.y.is_finite() {
            return PanelOutcome::Ignored;
        }
        self.phase = Phase::Dragging(GestureSession::begin(event, self.height));
        self.scroll_lock.lock();
        PanelOutcome::DragStarted
    }

    fn drag(&mut self, event: &PointerEvent) -> PanelOutcome {
        let Phase::Dragging(session) = &mut self.phase else {
            return PanelOutcome::Ignored;
        };
        if !session.captures(event) {
            return PanelOutcome::Ignored;
        }
        self.height = session.track(event.y, &self.config);
        PanelOutcome::Resized {
            height: self.height,
        }
    }

    fn end(&mut self, event: &PointerEvent) -> PanelOutcome {
        let session = match &mut self.phase {
            Phase::Dragging(session) if session.captures(event) => session,
            _ => return PanelOutcome::Ignored,
        };
        if event.phase == PointerPhase::Up {
            session.track(event.y, &self.config);
        }
        let candidate = session.candidate_height;
        let elapsed = session.started_at.elapsed();

        self.phase = Phase::Resting;
        self.scroll_lock.unlock();

        let open = candidate > self.config.snap_height();
        debug!(
            "Panel drag ended at {:.0}px after {:?}; snapping {}",
            candidate,
            elapsed,
            if open { "open" } else { "closed" }
        );
        self.snap(open)
    }

    fn snap(&mut self, open: bool) -> PanelOutcome {
        let target = if open {
            self.config.open_height
        } else {
            self.config.closed_height
        };
        self.height = self.config.clamp(target);
        self.open = open;
        if let Some(handler) = self.on_toggle.as_mut() {
            handler(open);
        }
        PanelOutcome::Snapped {
            height: self.height,
            open,
        }
    }
}

impl Drop for PanelGestureController {
    fn drop(&mut self) {
        if self.is_dragging() {
            self.scroll_lock.unlock();
        }
    }
}
