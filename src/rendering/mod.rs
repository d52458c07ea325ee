pub mod backend;
pub mod headless;

pub use backend::{MapContainer, MarkerDraw, NativeMarkerId, RenderBackend};
pub use headless::{HeadlessBackend, HeadlessScene};
