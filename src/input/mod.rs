pub mod events;
pub mod panel;

// Re-export the essential types
pub use events::{PointerEvent, PointerPhase, PointerSource, PointerTarget};
pub use panel::{
    GestureSession, NoScrollLock, PanelGestureController, PanelOutcome, PanelState, ScrollLock,
    ToggleHandler,
};
