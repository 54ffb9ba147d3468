//! Enforces the maximum change of the chassis velocity vector.

use crate::kinodynamics::KinodynamicLimits;

#[cfg(test)]
#[path = "capsize_limiter_tests.rs"]
mod capsize_limiter_tests;

/// Limits the change of the chassis velocity per cycle so that the robot does not tip over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsizeAccelerationLimiter {
    max_capsize_acceleration: f64,
}

impl CapsizeAccelerationLimiter {
    /// Returns the smaller of `min_s` and the largest interpolant for which the velocity change
    /// `(dx, dy)` stays within the capsize acceleration.
    pub fn enforce_centripetal_limit(&self, dx: f64, dy: f64, min_s: f64, dt: f64) -> f64 {
        let dv = dx.hypot(dy);
        if dv <= f64::EPSILON {
            return min_s;
        }

        let s = dt * self.max_capsize_acceleration / dv;
        f64::min(min_s, s)
    }

    /// Creates a new [CapsizeAccelerationLimiter] for the given limits.
    pub fn new(limits: &KinodynamicLimits) -> Self {
        Self {
            max_capsize_acceleration: limits.max_capsize_acceleration(),
        }
    }
}
