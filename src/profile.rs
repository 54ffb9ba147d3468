//! One dimensional motion profiles.
//!
//! A motion profile moves a [MotionState1D](crate::motion_state::MotionState1D) from a start
//! state to a goal state without exceeding the velocity, acceleration and, optionally, jerk
//! constraints. The [MotionProfile](motion_profile::MotionProfile) is a complete, time indexed
//! plan. The [TrapezoidProfile](trapezoid_profile::TrapezoidProfile) re-plans every control cycle
//! from the current state and returns the state one control period ahead.

use serde::Deserialize;

use crate::Error;

/// Provides the time indexed motion profile
pub mod motion_profile;

/// Provides the per-cycle trapezoidal profile
pub mod trapezoid_profile;

/// The velocity, acceleration and jerk limits for a motion profile.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ProfileConstraints {
    max_velocity: f64,
    max_acceleration: f64,
    #[serde(default)]
    max_jerk: Option<f64>,
}

impl ProfileConstraints {
    /// Returns a value indicating whether the constraints can be used to create a profile, i.e.
    /// all the limits are positive and finite.
    pub fn is_valid(&self) -> bool {
        let jerk_valid = match self.max_jerk {
            Some(j) => j.is_finite() && j > 0.0,
            None => true,
        };

        self.max_velocity.is_finite()
            && self.max_velocity > 0.0
            && self.max_acceleration.is_finite()
            && self.max_acceleration > 0.0
            && jerk_valid
    }

    /// Returns the maximum acceleration.
    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    /// Returns the maximum jerk, if the profile should be jerk limited.
    pub fn max_jerk(&self) -> Option<f64> {
        self.max_jerk
    }

    /// Returns the maximum velocity.
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Creates a new [ProfileConstraints] without validating the values.
    ///
    /// ## Parameters
    ///
    /// * 'max_velocity' - The maximum velocity
    /// * 'max_acceleration' - The maximum acceleration
    /// * 'max_jerk' - The maximum jerk, or [None] if the jerk is not limited
    pub fn new(max_velocity: f64, max_acceleration: f64, max_jerk: Option<f64>) -> Self {
        Self {
            max_velocity,
            max_acceleration,
            max_jerk,
        }
    }

    /// Creates a new [ProfileConstraints] and checks that the values are usable.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when one of the limits is not a positive
    ///   finite number.
    pub fn try_new(
        max_velocity: f64,
        max_acceleration: f64,
        max_jerk: Option<f64>,
    ) -> Result<Self, Error> {
        let result = Self::new(max_velocity, max_acceleration, max_jerk);
        if result.is_valid() {
            Ok(result)
        } else {
            Err(Error::InvalidConfiguration {
                name: "profile_constraints".to_string(),
                reason: format!(
                    "expected positive finite limits, got velocity {}, acceleration {}, jerk {:?}",
                    max_velocity, max_acceleration, max_jerk
                ),
            })
        }
    }

    /// Returns the same constraints without the jerk limit.
    pub fn without_jerk(&self) -> Self {
        Self::new(self.max_velocity, self.max_acceleration, None)
    }
}
