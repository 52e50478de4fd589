/// Post-release inertia: plain exponential decay, one step per frame.
/// No spring, no overshoot; the wheel settles wherever the geometric
/// series runs out.
#[derive(Debug, Clone)]
pub struct Spin {
    velocity: f64,
    damping: f64,
    epsilon: f64,
}

/// Outcome of one frame step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpinStep {
    Continue { angle: f64 },
    Settled { angle: f64 },
}

impl SpinStep {
    pub fn angle(&self) -> f64 {
        match *self {
            SpinStep::Continue { angle } | SpinStep::Settled { angle } => angle,
        }
    }
}

impl Spin {
    pub fn new(velocity: f64, damping: f64, epsilon: f64) -> Self {
        Self {
            velocity,
            damping,
            epsilon,
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Applies one frame of decay to `angle`: damp, advance, then check the
    /// settle threshold.
    pub fn step(&mut self, angle: f64) -> SpinStep {
        self.velocity *= self.damping;
        let angle = angle + self.velocity;
        if self.velocity.abs() < self.epsilon {
            SpinStep::Settled { angle }
        } else {
            SpinStep::Continue { angle }
        }
    }

    /// Total angular travel the decay will cover from the current velocity,
    /// by the geometric series `v·d/(1−d)`. Slightly overestimates the
    /// frame-stepped travel by the tail cut off at the settle threshold.
    pub fn projected_travel(&self) -> f64 {
        self.velocity * self.damping / (1.0 - self.damping)
    }
}
