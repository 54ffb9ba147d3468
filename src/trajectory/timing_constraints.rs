//! Velocity and acceleration constraints that apply at a point on a path.

use std::fmt::Debug;

use crate::kinodynamics::KinodynamicLimits;

use super::path::PathPoint;

#[cfg(test)]
#[path = "timing_constraints_tests.rs"]
mod timing_constraints_tests;

/// Curvatures and heading rates below this value are treated as zero.
const RATE_EPSILON: f64 = 1e-9;

/// The range of tangential accelerations that is allowed at a point on a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinMaxAcceleration {
    /// The smallest, usually negative, allowed acceleration in meters / second^2.
    pub min: f64,

    /// The largest allowed acceleration in meters / second^2.
    pub max: f64,
}

impl MinMaxAcceleration {
    /// Returns the intersection of the two ranges.
    pub fn intersect(&self, other: &MinMaxAcceleration) -> MinMaxAcceleration {
        MinMaxAcceleration {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

    /// Returns a value indicating whether the range contains at least one value.
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    /// Creates a new [MinMaxAcceleration].
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns the range that does not limit the acceleration.
    pub fn unconstrained() -> Self {
        Self {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

impl Default for MinMaxAcceleration {
    fn default() -> Self {
        Self::unconstrained()
    }
}

/// Limits the motion of the robot at a point on a path.
pub trait TimingConstraint: Debug + Send {
    /// Returns the largest allowed speed along the path at the given point.
    fn max_velocity(&self, point: &PathPoint) -> f64;

    /// Returns the allowed tangential accelerations at the given point when moving with the
    /// given speed.
    fn min_max_acceleration(&self, point: &PathPoint, velocity: f64) -> MinMaxAcceleration;
}

/// Limits the speed in curves so that the centripetal acceleration does not tip the robot over.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CentripetalConstraint {
    max_centripetal_acceleration: f64,
}

impl CentripetalConstraint {
    /// Creates a new [CentripetalConstraint].
    pub fn new(max_centripetal_acceleration: f64) -> Self {
        Self {
            max_centripetal_acceleration,
        }
    }
}

impl TimingConstraint for CentripetalConstraint {
    fn max_velocity(&self, point: &PathPoint) -> f64 {
        let curvature = point.curvature().abs();
        if curvature < RATE_EPSILON {
            return f64::INFINITY;
        }

        (self.max_centripetal_acceleration / curvature).sqrt()
    }

    fn min_max_acceleration(&self, _point: &PathPoint, _velocity: f64) -> MinMaxAcceleration {
        MinMaxAcceleration::unconstrained()
    }
}

/// Limits the speed and acceleration to what the modules can deliver.
///
/// When the robot rotates while it drives, part of the speed of the outermost module is used
/// for the rotation. The translational speed and acceleration are reduced by that share.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrivetrainConstraint {
    max_drive_velocity: f64,
    max_drive_acceleration: f64,
    max_angular_velocity: f64,
    max_angular_acceleration: f64,
    max_module_radius: f64,
}

impl DrivetrainConstraint {
    /// Creates a new [DrivetrainConstraint] from the limits of the drivetrain.
    pub fn new(limits: &KinodynamicLimits) -> Self {
        Self {
            max_drive_velocity: limits.max_drive_velocity(),
            max_drive_acceleration: limits.max_drive_acceleration(),
            max_angular_velocity: limits.max_angular_velocity(),
            max_angular_acceleration: limits.max_angular_acceleration(),
            max_module_radius: limits.max_module_radius(),
        }
    }

    fn rotation_share(&self, point: &PathPoint) -> f64 {
        1.0 + point.heading_rate().abs() * self.max_module_radius
    }
}

impl TimingConstraint for DrivetrainConstraint {
    fn max_velocity(&self, point: &PathPoint) -> f64 {
        let translation = self.max_drive_velocity / self.rotation_share(point);
        let heading_rate = point.heading_rate().abs();
        if heading_rate < RATE_EPSILON {
            return translation;
        }

        translation.min(self.max_angular_velocity / heading_rate)
    }

    fn min_max_acceleration(&self, point: &PathPoint, _velocity: f64) -> MinMaxAcceleration {
        let mut max = self.max_drive_acceleration / self.rotation_share(point);

        let heading_rate = point.heading_rate().abs();
        if heading_rate >= RATE_EPSILON {
            max = max.min(self.max_angular_acceleration / heading_rate);
        }

        MinMaxAcceleration::new(-max, max)
    }
}

/// Limits the combined lateral and tangential acceleration to the friction of the tires.
///
/// The lateral acceleration `v^2 * curvature` and the tangential acceleration share the
/// friction budget, i.e. the total acceleration has to stay inside the friction circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrictionConstraint {
    max_friction_acceleration: f64,
}

impl FrictionConstraint {
    /// Creates a new [FrictionConstraint].
    pub fn new(max_friction_acceleration: f64) -> Self {
        Self {
            max_friction_acceleration,
        }
    }
}

impl TimingConstraint for FrictionConstraint {
    fn max_velocity(&self, point: &PathPoint) -> f64 {
        let curvature = point.curvature().abs();
        if curvature < RATE_EPSILON {
            return f64::INFINITY;
        }

        (self.max_friction_acceleration / curvature).sqrt()
    }

    fn min_max_acceleration(&self, point: &PathPoint, velocity: f64) -> MinMaxAcceleration {
        let lateral = velocity * velocity * point.curvature().abs();
        let remaining = self.max_friction_acceleration * self.max_friction_acceleration
            - lateral * lateral;
        let tangential = remaining.max(0.0).sqrt();

        MinMaxAcceleration::new(-tangential, tangential)
    }
}
