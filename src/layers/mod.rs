pub mod declutter;
pub mod marker;

pub use declutter::{crosses_hemisphere, screen_angle, DeclutterEngine};
pub use marker::{MarkerRecord, MarkerRegistry, MarkerUpdate, Placement};
