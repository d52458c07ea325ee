pub mod marker;
pub mod popup;
pub mod reconciler;
pub mod registry;

pub use marker::{Marker, MarkerIcon, MarkerVariant};
pub use popup::PopupBody;
pub use reconciler::{MarkerOp, MarkerReconciler, MarkerSet, ReconcilePlan};
pub use registry::{MarkerKey, MarkerRegistry, RenderedMarkerEntry};
