//! A trapezoidal profile that re-plans from the current state every control cycle.

use log::warn;

use crate::motion_state::MotionState1D;

use super::{motion_profile::MotionProfile, ProfileConstraints};

#[cfg(test)]
#[path = "trapezoid_profile_tests.rs"]
mod trapezoid_profile_tests;

/// Steps a trapezoidal motion profile forward one control period at a time.
///
/// Every call plans a new trapezoid from the supplied current state, so the profile follows the
/// state it is given rather than the state it predicted. The jerk limit in the constraints, if
/// any, is ignored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrapezoidProfile {
    constraints: ProfileConstraints,
    tolerance: f64,
}

impl TrapezoidProfile {
    /// Returns the state `dt` seconds along the profile from `current` towards `goal`.
    ///
    /// When the current state is within tolerance of the goal, in both position and velocity,
    /// the goal is returned directly. When `dt` is not a positive finite number the current
    /// state is held.
    ///
    /// ## Parameters
    ///
    /// * 'dt' - The time step in seconds
    /// * 'current' - The current state
    /// * 'goal' - The goal state
    pub fn calculate(&self, dt: f64, current: &MotionState1D, goal: &MotionState1D) -> MotionState1D {
        if !dt.is_finite() || dt <= 0.0 {
            warn!("Invalid profile time step {}. Holding the current state.", dt);
            return if current.is_finite() {
                MotionState1D::at_rest(current.position())
            } else {
                MotionState1D::default()
            };
        }

        if current.is_near(goal, self.tolerance, self.tolerance) {
            return MotionState1D::new(goal.position(), goal.velocity());
        }

        MotionProfile::trapezoidal(current, goal, &self.constraints).get(dt)
    }

    /// Returns the constraints of the profile.
    pub fn constraints(&self) -> &ProfileConstraints {
        &self.constraints
    }

    /// Creates a new [TrapezoidProfile].
    ///
    /// ## Parameters
    ///
    /// * 'constraints' - The velocity and acceleration limits. The jerk limit is not used.
    /// * 'tolerance' - The position and velocity tolerance within which the goal is considered
    ///   reached
    pub fn new(constraints: ProfileConstraints, tolerance: f64) -> Self {
        Self {
            constraints: constraints.without_jerk(),
            tolerance: tolerance.abs(),
        }
    }

    /// Returns the time it would take to reach the goal from the current state.
    pub fn time_to_goal(&self, current: &MotionState1D, goal: &MotionState1D) -> f64 {
        MotionProfile::trapezoidal(current, goal, &self.constraints).duration()
    }
}
