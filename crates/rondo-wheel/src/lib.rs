//! Rotational ring selector: a fixed set of items spaced evenly around a
//! circle, rotated by drag gestures, with post-release inertia. The crate is
//! pure state + geometry; rendering and input plumbing live in the GUI crate.

use std::f64::consts::PI;

pub mod geometry;
pub mod spin;
pub mod tracker;
pub mod wheel;

pub use geometry::{Point, SlotPosition};
pub use spin::{Spin, SpinStep};
pub use tracker::DragTracker;
pub use wheel::{ParamError, Selection, Wheel, WheelParams, WheelUpdate};

/// Screen angle of the selection anchor (12 o'clock).
pub const ANCHOR_ANGLE: f64 = -PI / 2.0;
/// Angular distance below which a slot reports the advisory `is_top` flag.
pub const TOP_TOLERANCE: f64 = 0.15;
/// Default pointer-delta to rotation-delta scaling.
pub const SENSITIVITY: f64 = 0.05;
/// Per-frame multiplicative velocity decay during inertia.
pub const DAMPING: f64 = 0.95;
/// Inertia settles once |velocity| drops below this.
pub const SETTLE_EPSILON: f64 = 0.001;
/// Minimum wall time between accepted drag samples.
pub const SAMPLE_INTERVAL_MS: u64 = 50;
/// Frame budget velocities are normalized to (~60fps).
pub const FRAME_MS: f64 = 16.0;
