use crate::geometry::{self, Point, SlotPosition};
use crate::spin::{Spin, SpinStep};
use crate::tracker::DragTracker;
use crate::{DAMPING, SAMPLE_INTERVAL_MS, SENSITIVITY, SETTLE_EPSILON, TOP_TOLERANCE};
use std::f64::consts::TAU;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelParams {
    /// Pointer-angle delta to rotation delta scaling.
    pub sensitivity: f64,
    /// Per-frame velocity decay during inertia.
    pub damping: f64,
    /// Inertia settles below this velocity magnitude.
    pub settle_epsilon: f64,
    /// Advisory top-flag tolerance; clamped below half the angular step.
    pub top_tolerance: f64,
    /// Minimum wall time between accepted drag samples.
    pub sample_interval_ms: u64,
}

impl Default for WheelParams {
    fn default() -> Self {
        Self {
            sensitivity: SENSITIVITY,
            damping: DAMPING,
            settle_epsilon: SETTLE_EPSILON,
            top_tolerance: TOP_TOLERANCE,
            sample_interval_ms: SAMPLE_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("damping must be within (0, 1), got {0}")]
    Damping(f64),
    #[error("settle epsilon must be positive, got {0}")]
    SettleEpsilon(f64),
    #[error("sensitivity must be positive, got {0}")]
    Sensitivity(f64),
}

impl WheelParams {
    /// Rejects values the decay loop cannot terminate under.
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ParamError::Damping(self.damping));
        }
        if !(self.settle_epsilon > 0.0) {
            return Err(ParamError::SettleEpsilon(self.settle_epsilon));
        }
        if !(self.sensitivity > 0.0) {
            return Err(ParamError::Sensitivity(self.sensitivity));
        }
        Ok(())
    }

    /// A tolerance at or above half the angular step would let two slots
    /// report top simultaneously; clamp it for the given ring size.
    fn clamped_for(mut self, slot_count: usize) -> Self {
        if slot_count == 0 {
            return self;
        }
        let limit = TAU / slot_count as f64 / 2.0;
        if self.top_tolerance >= limit {
            let clamped = limit * 0.99;
            log::warn!(
                "top tolerance {} exceeds half step for {} slots, clamping to {:.4}",
                self.top_tolerance,
                slot_count,
                clamped
            );
            self.top_tolerance = clamped;
        }
        self
    }
}

/// What a committed slot means: a real item, or the trailing synthetic
/// overflow slot when the ring carries one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Item(usize),
    Overflow,
}

/// Tells the caller whether anything worth re-rendering happened. The top
/// index is cached and compared so unchanged resolutions stay silent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelUpdate {
    pub redraw: bool,
    pub top_changed: bool,
}

/// The full rotational selector: ring membership is fixed for the lifetime
/// of the wheel, the angle is unbounded and accumulates across drags, and
/// exactly one of {drag, spin} writes to it at a time.
pub struct Wheel {
    item_count: usize,
    overflow: bool,
    params: WheelParams,
    angle: f64,
    top_index: Option<usize>,
    drag: Option<DragTracker>,
    spin: Option<Spin>,
    generation: u64,
}

impl Wheel {
    pub fn new(item_count: usize, overflow: bool, params: WheelParams) -> Self {
        let slot_count = item_count + overflow as usize;
        let params = params.clamped_for(slot_count);
        Self {
            item_count,
            overflow,
            params,
            angle: 0.0,
            top_index: geometry::resolve_top_index(0.0, slot_count),
            drag: None,
            spin: None,
            generation: 0,
        }
    }

    pub fn slot_count(&self) -> usize {
        self.item_count + self.overflow as usize
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn params(&self) -> &WheelParams {
        &self.params
    }

    pub fn is_spinning(&self) -> bool {
        self.spin.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Monotonic counter bumped whenever the active writer changes; lets a
    /// caller holding a scheduled frame callback detect staleness.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn top_index(&self) -> Option<usize> {
        self.top_index
    }

    pub fn top_selection(&self) -> Option<Selection> {
        self.top_index.and_then(|i| self.selection_at(i))
    }

    fn selection_at(&self, index: usize) -> Option<Selection> {
        if index >= self.slot_count() {
            None
        } else if self.overflow && index == self.slot_count() - 1 {
            Some(Selection::Overflow)
        } else {
            Some(Selection::Item(index))
        }
    }

    pub fn slot_position(&self, index: usize, radius: f64, center: Point) -> SlotPosition {
        geometry::slot_position(
            index,
            self.slot_count(),
            self.angle,
            radius,
            center,
            self.params.top_tolerance,
        )
    }

    pub fn nearest_slot(&self, pointer: Point, center: Point) -> Option<usize> {
        geometry::nearest_slot(pointer, center, self.slot_count(), self.angle)
    }

    /// Gesture grant: cancels any in-flight inertia (velocity resets to
    /// zero) and anchors the drag at the touch-down point. Inertia already
    /// scheduled for this frame becomes a no-op via the generation bump.
    pub fn begin_drag(&mut self, center: Point, pointer: Point, now_ms: u64) -> WheelUpdate {
        let was_spinning = self.spin.take().is_some();
        self.generation += 1;
        self.drag = DragTracker::begin(
            center,
            pointer,
            self.angle,
            now_ms,
            self.params.sensitivity,
            self.params.sample_interval_ms,
        );
        WheelUpdate {
            redraw: was_spinning,
            top_changed: false,
        }
    }

    /// Gesture move: throttled and re-resolved per accepted sample.
    pub fn drag_to(&mut self, pointer: Point, now_ms: u64) -> WheelUpdate {
        let Some(tracker) = self.drag.as_mut() else {
            return WheelUpdate::default();
        };
        match tracker.sample(pointer, now_ms) {
            Some(angle) => {
                self.angle = angle;
                let top_changed = self.refresh_top();
                WheelUpdate {
                    redraw: true,
                    top_changed,
                }
            }
            None => WheelUpdate::default(),
        }
    }

    /// Gesture release: carries the release velocity into inertia. A
    /// velocity already below the settle threshold never starts a spin.
    pub fn end_drag(&mut self) -> WheelUpdate {
        let Some(tracker) = self.drag.take() else {
            return WheelUpdate::default();
        };
        let velocity = tracker.velocity();
        if velocity.abs() >= self.params.settle_epsilon {
            self.generation += 1;
            self.spin = Some(Spin::new(
                velocity,
                self.params.damping,
                self.params.settle_epsilon,
            ));
        }
        WheelUpdate::default()
    }

    /// One frame of inertia, driven by the platform's frame clock. A no-op
    /// unless a spin is active, so stale scheduled callbacks are harmless.
    pub fn tick(&mut self) -> WheelUpdate {
        let Some(spin) = self.spin.as_mut() else {
            return WheelUpdate::default();
        };
        match spin.step(self.angle) {
            SpinStep::Continue { angle } => self.angle = angle,
            SpinStep::Settled { angle } => {
                self.angle = angle;
                self.spin = None;
            }
        }
        let top_changed = self.refresh_top();
        WheelUpdate {
            redraw: true,
            top_changed,
        }
    }

    /// Direct tap on a slot: commits that index regardless of the current
    /// top or any in-flight inertia, both of which are cancelled.
    pub fn commit_tap(&mut self, index: usize) -> Option<Selection> {
        let selection = self.selection_at(index)?;
        self.stop();
        Some(selection)
    }

    /// Commits whatever the resolver currently reports at the anchor.
    pub fn commit_top(&mut self) -> Option<Selection> {
        let selection = self.top_selection()?;
        self.stop();
        Some(selection)
    }

    fn stop(&mut self) {
        self.generation += 1;
        self.drag = None;
        self.spin = None;
        // A commit is an interaction boundary; fold the accumulated angle
        // back into one turn so long sessions keep full float precision.
        self.angle = geometry::normalize_angle(self.angle);
        self.refresh_top();
    }

    fn refresh_top(&mut self) -> bool {
        let resolved = geometry::resolve_top_index(self.angle, self.slot_count());
        let changed = resolved != self.top_index;
        self.top_index = resolved;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn spun_up(params: WheelParams) -> Wheel {
        let mut wheel = Wheel::new(11, false, params);
        let center = Point::new(100.0, 100.0);
        wheel.begin_drag(center, Point::new(180.0, 100.0), 0);
        // Fast quarter sweep in 60ms leaves a healthy release velocity.
        wheel.drag_to(Point::new(100.0, 180.0), 60);
        wheel.end_drag();
        assert!(wheel.is_spinning());
        wheel
    }

    #[test]
    fn new_wheel_reports_item_zero_on_top() {
        let wheel = Wheel::new(11, false, WheelParams::default());
        assert_eq!(wheel.top_index(), Some(0));
        assert_eq!(wheel.top_selection(), Some(Selection::Item(0)));
        assert!(!wheel.is_spinning());
    }

    #[test]
    fn empty_wheel_has_no_selection() {
        let mut wheel = Wheel::new(0, false, WheelParams::default());
        assert_eq!(wheel.top_index(), None);
        assert_eq!(wheel.commit_top(), None);
        assert_eq!(wheel.commit_tap(0), None);
        assert_eq!(wheel.tick(), WheelUpdate::default());
    }

    #[test]
    fn overflow_slot_maps_to_the_overflow_action() {
        let wheel = Wheel::new(5, true, WheelParams::default());
        assert_eq!(wheel.slot_count(), 6);
        let mut wheel = wheel;
        assert_eq!(wheel.commit_tap(5), Some(Selection::Overflow));
        assert_eq!(wheel.commit_tap(4), Some(Selection::Item(4)));
        assert_eq!(wheel.commit_tap(6), None);
    }

    #[test]
    fn drag_rotates_and_reports_redraw_once_per_accepted_sample() {
        let mut wheel = Wheel::new(8, false, WheelParams::default());
        let center = Point::new(100.0, 100.0);

        wheel.begin_drag(center, Point::new(180.0, 100.0), 0);
        let throttled = wheel.drag_to(Point::new(179.0, 110.0), 10);
        assert_eq!(throttled, WheelUpdate::default());

        let accepted = wheel.drag_to(Point::new(100.0, 180.0), 60);
        assert!(accepted.redraw);
        assert!((wheel.angle() - FRAC_PI_2 * SENSITIVITY).abs() < 1e-9);
    }

    #[test]
    fn small_drag_does_not_move_the_top_index() {
        let mut wheel = Wheel::new(11, false, WheelParams::default());
        let center = Point::new(100.0, 100.0);
        wheel.begin_drag(center, Point::new(180.0, 100.0), 0);
        let update = wheel.drag_to(Point::new(100.0, 180.0), 60);
        assert!(!update.top_changed);
        assert_eq!(wheel.top_index(), Some(0));
    }

    #[test]
    fn release_spins_and_settles_without_snapping() {
        let mut wheel = spun_up(WheelParams::default());
        let mut ticks = 0;
        while wheel.is_spinning() {
            let update = wheel.tick();
            assert!(update.redraw);
            ticks += 1;
            assert!(ticks < 10_000, "spin failed to settle");
        }
        // Settled state keeps the decayed rest angle but still resolves a
        // discrete top index.
        assert!(wheel.top_index().is_some());
        let rest = wheel.angle();
        assert_eq!(wheel.tick(), WheelUpdate::default());
        assert_eq!(wheel.angle(), rest);
    }

    #[test]
    fn new_grant_cancels_inertia_and_resets_velocity() {
        let mut wheel = spun_up(WheelParams::default());
        let generation = wheel.generation();

        let update = wheel.begin_drag(Point::new(100.0, 100.0), Point::new(180.0, 100.0), 500);
        assert!(update.redraw);
        assert!(!wheel.is_spinning());
        assert!(wheel.is_dragging());
        assert!(wheel.generation() > generation);
        // The stale frame step is now a no-op on the spin side.
        let angle = wheel.angle();
        wheel.end_drag();
        assert!(!wheel.is_spinning());
        assert_eq!(wheel.angle(), angle);
    }

    #[test]
    fn tap_commits_any_index_and_cancels_inertia() {
        let mut wheel = spun_up(WheelParams::default());
        assert_eq!(wheel.commit_tap(5), Some(Selection::Item(5)));
        assert!(!wheel.is_spinning());
        assert!(!wheel.is_dragging());
        // Resting angle folded into one turn at the commit boundary.
        assert!((0.0..TAU).contains(&wheel.angle()));
    }

    #[test]
    fn top_changed_fires_only_when_the_resolution_moves() {
        // Unit sensitivity so the pointer sweep maps 1:1 onto rotation.
        let params = WheelParams {
            sensitivity: 1.0,
            ..WheelParams::default()
        };
        let mut wheel = Wheel::new(4, false, params);
        let center = Point::new(0.0, 0.0);
        // Sweep far enough to walk the top index through several slots.
        wheel.begin_drag(center, Point::new(80.0, 0.0), 0);
        let mut changes = 0;
        let mut accepted = 0;
        for i in 1..=40 {
            let angle = i as f64 * 0.075;
            let pointer = Point::new(80.0 * angle.cos(), 80.0 * angle.sin());
            let update = wheel.drag_to(pointer, i * 60);
            if update.redraw {
                accepted += 1;
            }
            if update.top_changed {
                changes += 1;
            }
        }
        assert!(accepted > 0);
        // Redraws happen per accepted sample; top changes are much rarer
        // but the three-radian sweep crosses at least one slot boundary.
        assert!(changes >= 1);
        assert!(changes < accepted);
    }

    #[test]
    fn invalid_params_are_rejected() {
        let bad = WheelParams {
            damping: 1.0,
            ..WheelParams::default()
        };
        assert_eq!(bad.validate(), Err(ParamError::Damping(1.0)));

        let bad = WheelParams {
            settle_epsilon: 0.0,
            ..WheelParams::default()
        };
        assert!(matches!(bad.validate(), Err(ParamError::SettleEpsilon(_))));

        assert!(WheelParams::default().validate().is_ok());
    }

    #[test]
    fn oversized_tolerance_is_clamped_to_keep_one_top() {
        // 24 slots: step/2 ≈ 0.1309, below the 0.15 default tolerance.
        let wheel = Wheel::new(24, false, WheelParams::default());
        let limit = TAU / 24.0 / 2.0;
        assert!(wheel.params().top_tolerance < limit);
    }
}
