use crate::ANCHOR_ANGLE;
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Wraps an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    angle.rem_euclid(TAU)
}

/// Shortest angular distance between two angles, in `[0, π]`.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    ((a - b + PI).rem_euclid(TAU) - PI).abs()
}

/// Screen angle of slot `index` for the given rotation. Slot 0 sits at the
/// anchor when the rotation angle is zero.
pub fn slot_angle(index: usize, total: usize, current_angle: f64) -> f64 {
    let step = TAU / total as f64;
    ANCHOR_ANGLE + index as f64 * step + current_angle
}

/// Where a slot lands on screen, plus the advisory top flag used for
/// rendering emphasis. The authoritative top slot comes from
/// [`resolve_top_index`]; the two agree as long as `tolerance` stays below
/// half the angular step.
#[derive(Debug, Clone, Copy)]
pub struct SlotPosition {
    pub center: Point,
    pub angle: f64,
    pub is_top: bool,
}

pub fn slot_position(
    index: usize,
    total: usize,
    current_angle: f64,
    radius: f64,
    center: Point,
    tolerance: f64,
) -> SlotPosition {
    let angle = slot_angle(index, total, current_angle);
    SlotPosition {
        center: Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        ),
        angle,
        is_top: angle_difference(angle, ANCHOR_ANGLE) < tolerance,
    }
}

/// The slot currently nearest the anchor. `None` only for the empty ring.
///
/// The rotation angle is unbounded; it is normalized here, never clamped by
/// callers. Exact half-step ties round away from zero, which is harmless:
/// the result is always in `[0, total)`.
pub fn resolve_top_index(current_angle: f64, total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let step = TAU / total as f64;
    let steps = (-normalize_angle(current_angle) / step).round() as i64;
    Some(steps.rem_euclid(total as i64) as usize)
}

/// Slot whose screen angle is closest to the pointer, for tap hit-testing.
/// Radial bounds (dead zone, outer edge) are the caller's concern.
pub fn nearest_slot(pointer: Point, center: Point, total: usize, current_angle: f64) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let (dx, dy) = (pointer.x - center.x, pointer.y - center.y);
    let pointer_angle = dy.atan2(dx);
    if !pointer_angle.is_finite() {
        return None;
    }

    (0..total).min_by(|&a, &b| {
        angle_difference(pointer_angle, slot_angle(a, total, current_angle)).total_cmp(
            &angle_difference(pointer_angle, slot_angle(b, total, current_angle)),
        )
    })
}
