//! Parametric motion primitives and their closed-form evaluation.

use schema::limits::DEFAULT_GRAVITY;

/// A 3-component world vector.
pub type Vec3 = [f32; 3];

/// The motion law of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrajectoryKind {
    /// Fixed at the base position.
    #[default]
    Stationary,
    /// Linear interpolation from base toward delta over the duration.
    Interpolate,
    /// Constant velocity, delta in units per second.
    Linear,
    /// Constant velocity, frozen once the duration elapses.
    LinearStop,
    /// Quadratic ease-out toward the linear endpoint of the duration.
    NonLinearStop,
    /// Sinusoidal oscillation around the base with amplitude delta.
    Sine,
    /// Ballistic arc under gravity.
    Gravity,
}

impl TrajectoryKind {
    /// Maps a wire value to a kind. Unknown values fall back to
    /// [`TrajectoryKind::Stationary`]; the raw value is kept elsewhere
    /// so re-encoding stays exact.
    #[must_use]
    pub const fn from_wire(raw: u8) -> Self {
        match raw {
            1 => Self::Interpolate,
            2 => Self::Linear,
            3 => Self::LinearStop,
            4 => Self::NonLinearStop,
            5 => Self::Sine,
            6 => Self::Gravity,
            _ => Self::Stationary,
        }
    }

    /// The wire value of this kind.
    #[must_use]
    pub const fn to_wire(self) -> u8 {
        match self {
            Self::Stationary => 0,
            Self::Interpolate => 1,
            Self::Linear => 2,
            Self::LinearStop => 3,
            Self::NonLinearStop => 4,
            Self::Sine => 5,
            Self::Gravity => 6,
        }
    }
}

/// A trajectory as carried by entity state.
///
/// `tr_type` keeps the raw wire value so that out-of-range inputs
/// round-trip unchanged; [`Trajectory::kind`] derives the motion law.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Trajectory {
    /// Raw wire trajectory type.
    pub tr_type: u8,
    /// Start time in milliseconds.
    pub start_time: i32,
    /// Duration in milliseconds; 0 means unbounded.
    pub duration: i32,
    /// Base vector.
    pub base: Vec3,
    /// Delta vector: velocity, amplitude, or target depending on kind.
    pub delta: Vec3,
}

impl Trajectory {
    /// Creates a stationary trajectory at a position.
    #[must_use]
    pub fn stationary(base: Vec3) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    /// The motion law for this trajectory.
    #[must_use]
    pub const fn kind(&self) -> TrajectoryKind {
        TrajectoryKind::from_wire(self.tr_type)
    }

    /// Fraction of the duration elapsed at `t`, clamped to `[0, 1]`.
    fn phase(&self, at_time: i32) -> f32 {
        if self.duration <= 0 {
            return 0.0;
        }
        let num = (at_time - self.start_time) as f32;
        (num / self.duration as f32).clamp(0.0, 1.0)
    }

    /// Position at time `t` (milliseconds) under the given gravity.
    #[must_use]
    pub fn position_at(&self, at_time: i32, gravity: f32) -> Vec3 {
        let dt = (at_time - self.start_time) as f32 / 1000.0;
        match self.kind() {
            TrajectoryKind::Stationary => self.base,
            TrajectoryKind::Interpolate => {
                let frac = self.phase(at_time);
                scale_add(self.base, sub(self.delta, self.base), frac)
            }
            TrajectoryKind::Linear => scale_add(self.base, self.delta, dt),
            TrajectoryKind::LinearStop => {
                if self.duration > 0 && at_time > self.start_time + self.duration {
                    scale_add(self.base, self.delta, self.duration as f32 / 1000.0)
                } else {
                    scale_add(self.base, self.delta, dt)
                }
            }
            TrajectoryKind::NonLinearStop => {
                let total = self.duration as f32 / 1000.0;
                if self.duration > 0 && at_time > self.start_time + self.duration {
                    return scale_add(self.base, self.delta, total);
                }
                let frac = self.phase(at_time);
                let eased = 1.0 - (1.0 - frac) * (1.0 - frac);
                scale_add(self.base, self.delta, total * eased)
            }
            TrajectoryKind::Sine => {
                if self.duration <= 0 {
                    return self.base;
                }
                let phase = (dt / (self.duration as f32 / 1000.0)) * std::f32::consts::TAU;
                scale_add(self.base, self.delta, phase.sin())
            }
            TrajectoryKind::Gravity => {
                let mut out = scale_add(self.base, self.delta, dt);
                out[2] -= 0.5 * gravity * dt * dt;
                out
            }
        }
    }

    /// Velocity at time `t` (milliseconds) under the given gravity.
    #[must_use]
    pub fn velocity_at(&self, at_time: i32, gravity: f32) -> Vec3 {
        let dt = (at_time - self.start_time) as f32 / 1000.0;
        match self.kind() {
            TrajectoryKind::Stationary => [0.0; 3],
            TrajectoryKind::Interpolate => {
                if self.duration <= 0 {
                    return [0.0; 3];
                }
                let rate = 1.0 / (self.duration as f32 / 1000.0);
                scale(sub(self.delta, self.base), rate)
            }
            TrajectoryKind::Linear => self.delta,
            TrajectoryKind::LinearStop => {
                if self.duration > 0 && at_time > self.start_time + self.duration {
                    [0.0; 3]
                } else {
                    self.delta
                }
            }
            TrajectoryKind::NonLinearStop => {
                if self.duration <= 0 {
                    return self.delta;
                }
                if at_time > self.start_time + self.duration {
                    return [0.0; 3];
                }
                let frac = self.phase(at_time);
                // d/dt of the quadratic ease-out, rescaled to seconds.
                let rate = 2.0 * (1.0 - frac) * (1000.0 / self.duration as f32);
                let total = self.duration as f32 / 1000.0;
                scale(self.delta, total * rate)
            }
            TrajectoryKind::Sine => {
                if self.duration <= 0 {
                    return [0.0; 3];
                }
                let omega = std::f32::consts::TAU / (self.duration as f32 / 1000.0);
                scale(self.delta, omega * (dt * omega).cos())
            }
            TrajectoryKind::Gravity => {
                let mut out = self.delta;
                out[2] -= gravity * dt;
                out
            }
        }
    }

    /// Position at time `t` under default gravity.
    #[must_use]
    pub fn position(&self, at_time: i32) -> Vec3 {
        self.position_at(at_time, DEFAULT_GRAVITY)
    }
}

fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn scale(v: Vec3, s: f32) -> Vec3 {
    [v[0] * s, v[1] * s, v[2] * s]
}

fn scale_add(base: Vec3, v: Vec3, s: f32) -> Vec3 {
    [base[0] + v[0] * s, base[1] + v[1] * s, base[2] + v[2] * s]
}
