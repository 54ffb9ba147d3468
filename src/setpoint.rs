//! Limits the change of the module states between two control cycles.
//!
//! The [SetpointGenerator](setpoint_generator::SetpointGenerator) interpolates from the setpoint
//! of the previous cycle towards the desired chassis twist. The interpolant `s` is the largest
//! value in [0, 1] for which the steering rate, the capsize acceleration and, optionally, the
//! drive wheel acceleration limits are met. Each limit is enforced by its own limiter.

use nalgebra::Vector2;

use crate::{kinematics::ModuleState, number_space::normalize_angle};

/// Provides the bounded root finding used by the limiters
pub mod interpolation;

/// Provides the steering rate limit
pub mod steering_rate_limiter;

/// Provides the capsize acceleration limit
pub mod capsize_limiter;

/// Provides the drive wheel acceleration limit
pub mod drive_acceleration_limiter;

/// Provides the setpoint generator
pub mod setpoint_generator;

/// The velocity of a single steering axis, as a vector and as a direction of travel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModuleVelocity {
    /// The velocity of the steering axis in the body frame.
    pub velocity: Vector2<f64>,

    /// The direction of travel. This differs from the steering angle by half a turn when the
    /// wheel is driven backwards.
    pub heading: f64,
}

impl ModuleVelocity {
    /// Returns the velocity of the module described by the given state.
    pub fn from_state(state: &ModuleState) -> Self {
        let heading = if state.speed() < 0.0 {
            normalize_angle(state.angle() + std::f64::consts::PI)
        } else {
            state.angle()
        };

        Self {
            velocity: state.velocity(),
            heading,
        }
    }

    /// Returns the speed of the module.
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}
