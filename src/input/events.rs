use serde::{Deserialize, Serialize};

/// Phase of a pointer or touch interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// Which device produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

/// Element the event was hit-tested against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    /// The panel's drag handle
    Handle,
    /// Anywhere else in the window
    Elsewhere,
}

/// Pointer/touch input in window coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub pointer_id: u64,
    pub y: f64,
    pub target: PointerTarget,
    pub source: PointerSource,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, y: f64, target: PointerTarget) -> Self {
        Self {
            phase,
            pointer_id: 0,
            y,
            target,
            source: PointerSource::Mouse,
        }
    }

    pub fn down_on_handle(y: f64) -> Self {
        Self::new(PointerPhase::Down, y, PointerTarget::Handle)
    }

    pub fn move_to(y: f64) -> Self {
        Self::new(PointerPhase::Move, y, PointerTarget::Elsewhere)
    }

    pub fn up_at(y: f64) -> Self {
        Self::new(PointerPhase::Up, y, PointerTarget::Elsewhere)
    }

    pub fn cancel() -> Self {
        Self::new(PointerPhase::Cancel, f64::NAN, PointerTarget::Elsewhere)
    }

    pub fn touch(mut self, pointer_id: u64) -> Self {
        self.source = PointerSource::Touch;
        self.pointer_id = pointer_id;
        self
    }

    pub fn on(mut self, target: PointerTarget) -> Self {
        self.target = target;
        self
    }

    /// Ends an interaction, successfully or not
    pub fn is_release(&self) -> bool {
        matches!(self.phase, PointerPhase::Up | PointerPhase::Cancel)
    }
}
