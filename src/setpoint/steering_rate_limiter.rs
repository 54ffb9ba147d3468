//! Enforces the maximum steering rate of the modules.

use log::debug;

use crate::{
    kinematics::{ModuleState, MODULE_SPEED_EPSILON},
    kinodynamics::KinodynamicLimits,
    number_space::shortest_angular_distance,
};

use super::{
    interpolation::{find_steering_max_s, flip_heading},
    ModuleVelocity,
};

#[cfg(test)]
#[path = "steering_rate_limiter_tests.rs"]
mod steering_rate_limiter_tests;

/// The outcome of enforcing the steering rate limit.
#[derive(Clone, Debug, PartialEq)]
pub struct SteeringLimit {
    /// The largest interpolant, in [0, 1], for which no module steers faster than the limit.
    pub s: f64,

    /// For each module the steering angle that has to be commanded instead of the angle
    /// computed from the interpolated twist, if any.
    pub overrides: Vec<Option<f64>>,
}

/// Limits the interpolant so that no module has to steer faster than the maximum steering
/// velocity.
///
/// Modules that are stopped are handled separately: they can turn in place without moving
/// the robot, so they either steer straight to the desired angle or, when that takes more than
/// one cycle, steer as far as they can while the whole robot waits for them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringRateLimiter {
    max_steering_velocity: f64,
}

impl SteeringRateLimiter {
    /// Returns the largest interpolant for which the steering rate limit is met, together with
    /// the steering overrides for the stopped modules.
    ///
    /// Once the interpolant is zero the moving modules are no longer checked because they can
    /// not lower it further.
    ///
    /// ## Parameters
    ///
    /// * 'desired_states' - The desired module states
    /// * 'previous_states' - The module states of the previous cycle
    /// * 'need_to_steer' - False if the modules should keep their current angles
    /// * 'previous' - The velocities of the modules in the previous cycle
    /// * 'desired' - The desired velocities of the modules
    /// * 'dt' - The control period in seconds
    pub fn enforce_steering_limit(
        &self,
        desired_states: &[ModuleState],
        previous_states: &[ModuleState],
        need_to_steer: bool,
        previous: &[ModuleVelocity],
        desired: &[ModuleVelocity],
        dt: f64,
    ) -> SteeringLimit {
        let mut min_s = 1.0;
        let mut overrides = Vec::with_capacity(previous_states.len());

        let max_theta_step = dt * self.max_steering_velocity;
        for (i, previous_state) in previous_states.iter().enumerate() {
            if !need_to_steer {
                overrides.push(Some(previous_state.angle()));
                continue;
            }

            if previous_state.speed().abs() <= MODULE_SPEED_EPSILON {
                let desired_state = &desired_states[i];
                if desired_state.speed().abs() <= MODULE_SPEED_EPSILON {
                    // Stays stopped, so the angle does not matter
                    overrides.push(Some(previous_state.angle()));
                    continue;
                }

                let mut rotation =
                    shortest_angular_distance(previous_state.angle(), desired_state.angle());
                if flip_heading(rotation) {
                    rotation = shortest_angular_distance(0.0, rotation + std::f64::consts::PI);
                }

                let steps_needed = rotation.abs() / max_theta_step;
                if steps_needed <= 1.0 {
                    overrides.push(Some(desired_state.angle()));
                } else {
                    overrides.push(Some(
                        previous_state.angle() + rotation.signum() * max_theta_step,
                    ));
                    min_s = 0.0;
                }

                continue;
            }

            overrides.push(None);
            if min_s == 0.0 {
                continue;
            }

            let s = find_steering_max_s(
                previous[i].velocity,
                previous[i].heading,
                desired[i].velocity,
                desired[i].heading,
                max_theta_step,
            );
            min_s = f64::min(min_s, s);
        }

        debug!("Steering rate limit s: {}", min_s);
        SteeringLimit { s: min_s, overrides }
    }

    /// Creates a new [SteeringRateLimiter] for the given limits.
    pub fn new(limits: &KinodynamicLimits) -> Self {
        Self {
            max_steering_velocity: limits.max_steering_velocity(),
        }
    }
}
