pub mod model;
pub mod view;

pub use model::{State, WheelItem};
pub use view::draw;

/// Layout constants are tuned against this screen height and scaled by the
/// actual viewport.
pub const REFERENCE_HEIGHT: f64 = 1440.0;
pub const ICON_SIZE: i32 = 256;
pub const WHEEL_RADIUS: f64 = 180.0; // slot orbital radius
pub const SLOT_RADIUS: f64 = 48.0; // slot bg circle size
pub const TOP_SCALE: f64 = 1.35; // size boost for the anchored slot
pub const CENTER_CIRCLE_RADIUS: f64 = 32.0;
pub const ICON_INACTIVE_ALPHA: f64 = 0.6;
pub const DEAD_ZONE_RADIUS: f64 = 40.0; // taps inside this do nothing
pub const TAP_SLACK: f64 = 56.0; // radial reach beyond the ring for taps
