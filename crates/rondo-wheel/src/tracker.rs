use crate::geometry::Point;
use crate::FRAME_MS;

/// Maps one drag gesture onto the wheel's rotation angle.
///
/// The pointer delta is always measured against the original touch-down
/// point, not the previous sample. Known limitation: a finger crossing the
/// ±π branch cut of `atan2` mid-drag jumps the delta by 2π; the wheel
/// visibly skips rather than re-anchoring. Release and re-grab recovers.
#[derive(Debug, Clone)]
pub struct DragTracker {
    center: Point,
    sensitivity: f64,
    sample_interval_ms: u64,
    start_pointer_angle: f64,
    last_angle: f64,
    last_time_ms: u64,
    velocity: f64,
}

impl DragTracker {
    /// Captures the gesture grant. Returns `None` when the touch-down point
    /// yields no usable angle (degenerate coordinates); the gesture is then
    /// ignored entirely.
    pub fn begin(
        center: Point,
        pointer: Point,
        wheel_angle: f64,
        now_ms: u64,
        sensitivity: f64,
        sample_interval_ms: u64,
    ) -> Option<Self> {
        let start_pointer_angle = pointer_angle(center, pointer)?;
        Some(Self {
            center,
            sensitivity,
            sample_interval_ms,
            start_pointer_angle,
            last_angle: wheel_angle,
            last_time_ms: now_ms,
            velocity: 0.0,
        })
    }

    /// Feeds a pointer-move sample. Returns the new wheel angle, or `None`
    /// when the sample is dropped: rate-limited (high-frequency events would
    /// over-rotate the wheel) or numerically degenerate.
    pub fn sample(&mut self, pointer: Point, now_ms: u64) -> Option<f64> {
        if now_ms.saturating_sub(self.last_time_ms) < self.sample_interval_ms {
            return None;
        }
        let angle = pointer_angle(self.center, pointer)?;

        let delta = angle - self.start_pointer_angle;
        let new_angle = self.last_angle + delta * self.sensitivity;

        let dt = now_ms.saturating_sub(self.last_time_ms).max(1) as f64;
        self.velocity = (new_angle - self.last_angle) / dt * FRAME_MS;
        self.last_angle = new_angle;
        self.last_time_ms = now_ms;
        Some(new_angle)
    }

    /// Release velocity, normalized to radians per 16ms frame.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

fn pointer_angle(center: Point, pointer: Point) -> Option<f64> {
    let angle = (pointer.y - center.y).atan2(pointer.x - center.x);
    angle.is_finite().then_some(angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, TAU};

    fn on_circle(center: Point, angle: f64, r: f64) -> Point {
        Point::new(center.x + r * angle.cos(), center.y + r * angle.sin())
    }

    #[test]
    fn quarter_turn_drag_scales_by_sensitivity() {
        // Ring of 11 items, k = 0.03: a raw π/2 pointer sweep moves the
        // wheel by ~0.0471 rad, well under one step (2π/11 ≈ 0.5712).
        let center = Point::new(100.0, 100.0);
        let mut tracker =
            DragTracker::begin(center, on_circle(center, 0.0, 80.0), 0.0, 0, 0.03, 50).unwrap();

        let new_angle = tracker
            .sample(on_circle(center, FRAC_PI_2, 80.0), 100)
            .unwrap();
        assert!((new_angle - FRAC_PI_2 * 0.03).abs() < 1e-9);
        assert!((new_angle - 0.0471).abs() < 1e-3);

        let step = TAU / 11.0;
        let before = crate::geometry::resolve_top_index(0.0, 11).unwrap();
        let after = crate::geometry::resolve_top_index(new_angle, 11).unwrap();
        let shift = (after as i64 - before as i64).rem_euclid(11).min(
            (before as i64 - after as i64).rem_euclid(11),
        );
        assert!(shift <= 1, "shift={shift} step={step}");
    }

    #[test]
    fn samples_inside_the_throttle_window_are_dropped() {
        let center = Point::default();
        let mut tracker =
            DragTracker::begin(center, Point::new(50.0, 0.0), 0.0, 1000, 0.05, 50).unwrap();

        assert!(tracker.sample(Point::new(0.0, 50.0), 1020).is_none());
        assert!(tracker.sample(Point::new(0.0, 50.0), 1049).is_none());
        assert!(tracker.sample(Point::new(0.0, 50.0), 1050).is_some());
    }

    #[test]
    fn velocity_is_zero_until_a_sample_is_accepted() {
        let center = Point::default();
        let tracker =
            DragTracker::begin(center, Point::new(50.0, 0.0), 2.0, 0, 0.05, 50).unwrap();
        assert_eq!(tracker.velocity(), 0.0);
    }

    #[test]
    fn velocity_normalizes_to_frame_budget() {
        let center = Point::default();
        let mut tracker =
            DragTracker::begin(center, Point::new(50.0, 0.0), 0.0, 0, 0.05, 50).unwrap();

        let new_angle = tracker.sample(Point::new(0.0, 50.0), 64).unwrap();
        // Δangle over 64ms, normalized to a 16ms frame.
        assert!((tracker.velocity() - new_angle / 64.0 * 16.0).abs() < 1e-12);
    }

    #[test]
    fn zero_time_delta_does_not_divide_by_zero() {
        let center = Point::default();
        let mut tracker =
            DragTracker::begin(center, Point::new(50.0, 0.0), 0.0, 0, 0.05, 0).unwrap();

        let angle = tracker.sample(Point::new(0.0, 50.0), 0).unwrap();
        assert!(tracker.velocity().is_finite());
        assert!(angle.is_finite());
    }

    #[test]
    fn degenerate_pointer_samples_are_skipped() {
        let center = Point::default();
        assert!(DragTracker::begin(center, Point::new(f64::NAN, 0.0), 0.0, 0, 0.05, 50).is_none());

        let mut tracker =
            DragTracker::begin(center, Point::new(50.0, 0.0), 0.0, 0, 0.05, 50).unwrap();
        assert!(tracker.sample(Point::new(f64::NAN, f64::NAN), 100).is_none());
        // The tracker stays usable after a bad sample.
        assert!(tracker.sample(Point::new(0.0, 50.0), 200).is_some());
    }

    #[test]
    fn delta_is_measured_from_the_initial_touch_point() {
        let center = Point::default();
        let mut tracker =
            DragTracker::begin(center, on_circle(center, 0.0, 60.0), 0.0, 0, 0.1, 10).unwrap();

        let first = tracker.sample(on_circle(center, 0.2, 60.0), 50).unwrap();
        assert!((first - 0.2 * 0.1).abs() < 1e-9);

        // Holding at the same pointer angle keeps adding the same total
        // delta to the last angle (observed accumulating behavior).
        let second = tracker.sample(on_circle(center, 0.2, 60.0), 100).unwrap();
        assert!((second - (first + 0.2 * 0.1)).abs() < 1e-9);
    }
}
