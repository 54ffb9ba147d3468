//! Enforces the maximum acceleration of the drive wheels.

use crate::kinodynamics::KinodynamicLimits;

use super::{interpolation::find_drive_max_s, ModuleVelocity};

#[cfg(test)]
#[path = "drive_acceleration_limiter_tests.rs"]
mod drive_acceleration_limiter_tests;

/// Limits the change in wheel speed per cycle to the maximum drive acceleration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriveAccelerationLimiter {
    max_drive_acceleration: f64,
}

impl DriveAccelerationLimiter {
    /// Returns the smaller of `min_s` and the largest interpolant for which no wheel changes
    /// speed faster than the drive acceleration limit.
    ///
    /// The search for each module is done on [0, min_s] because the interpolant can only go
    /// down.
    pub fn enforce_wheel_acceleration_limit(
        &self,
        previous: &[ModuleVelocity],
        desired: &[ModuleVelocity],
        min_s: f64,
        dt: f64,
    ) -> f64 {
        let max_velocity_step = dt * self.max_drive_acceleration;

        let mut min_s = min_s;
        for (p, d) in previous.iter().zip(desired.iter()) {
            if min_s == 0.0 {
                break;
            }

            let end = p.velocity + (d.velocity - p.velocity) * min_s;
            let s = min_s * find_drive_max_s(p.velocity, end, max_velocity_step);
            min_s = f64::min(min_s, s);
        }

        min_s
    }

    /// Creates a new [DriveAccelerationLimiter] for the given limits.
    pub fn new(limits: &KinodynamicLimits) -> Self {
        Self {
            max_drive_acceleration: limits.max_drive_acceleration(),
        }
    }
}
