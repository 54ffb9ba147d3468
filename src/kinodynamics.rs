//! Defines the kinodynamic limits of a swerve drivetrain.
//!
//! The limits combine the kinematic description of the drivetrain, i.e. where the modules are
//! located relative to the center of the robot, with the dynamic limits of the drive and steering
//! motors and the acceleration at which the robot would tip over. The limits are created once at
//! startup and are shared, read-only, by all parts of the control pipeline.

use nalgebra::Vector2;
use serde::Deserialize;

use crate::{profile::ProfileConstraints, Error};

#[cfg(test)]
#[path = "kinodynamics_tests.rs"]
mod kinodynamics_tests;

/// The minimum number of modules a swerve drivetrain must have to be controllable.
const MIN_NUMBER_OF_MODULES: usize = 2;

/// The raw, unvalidated, limits as they are stored in a configuration file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct KinodynamicLimitsParams {
    /// Maximum speed of a drive wheel.
    ///
    /// Units: meters / second
    pub max_drive_velocity: f64,

    /// Maximum acceleration of a drive wheel.
    ///
    /// Units: meters / second^2
    pub max_drive_acceleration: f64,

    /// Maximum rotation rate of the chassis.
    ///
    /// Units: radians / second
    pub max_angular_velocity: f64,

    /// Maximum rotational acceleration of the chassis.
    ///
    /// Units: radians / second^2
    pub max_angular_acceleration: f64,

    /// Maximum rotation rate of a steering axis.
    ///
    /// Units: radians / second
    pub max_steering_velocity: f64,

    /// Maximum change of the chassis velocity vector before the robot tips over.
    ///
    /// Units: meters / second^2
    pub max_capsize_acceleration: f64,

    /// The position of each steering axis relative to the robot center, in the robot body frame
    /// with x forward and y to the left.
    ///
    /// Units: meters
    pub module_offsets: Vec<[f64; 2]>,
}

/// The validated, immutable, kinodynamic limits of a swerve drivetrain.
#[derive(Clone, Debug, PartialEq)]
pub struct KinodynamicLimits {
    max_drive_velocity: f64,
    max_drive_acceleration: f64,
    max_angular_velocity: f64,
    max_angular_acceleration: f64,
    max_steering_velocity: f64,
    max_capsize_acceleration: f64,
    module_offsets: Vec<Vector2<f64>>,
}

impl KinodynamicLimits {
    /// Creates the limits from the raw configuration values.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when one of the limits is not a strictly
    ///   positive finite number, when there are fewer than two modules or when a module offset
    ///   is not finite.
    pub fn from_params(params: &KinodynamicLimitsParams) -> Result<Self, Error> {
        let offsets: Vec<Vector2<f64>> = params
            .module_offsets
            .iter()
            .map(|o| Vector2::new(o[0], o[1]))
            .collect();

        Self::new(
            params.max_drive_velocity,
            params.max_drive_acceleration,
            params.max_angular_velocity,
            params.max_angular_acceleration,
            params.max_steering_velocity,
            params.max_capsize_acceleration,
            offsets,
        )
    }

    /// Returns the maximum angular acceleration of the chassis in radians / second^2.
    pub fn max_angular_acceleration(&self) -> f64 {
        self.max_angular_acceleration
    }

    /// Returns the maximum rotation rate of the chassis in radians / second.
    pub fn max_angular_velocity(&self) -> f64 {
        self.max_angular_velocity
    }

    /// Returns the maximum change in chassis velocity before capsizing in meters / second^2.
    pub fn max_capsize_acceleration(&self) -> f64 {
        self.max_capsize_acceleration
    }

    /// Returns the maximum acceleration of a drive wheel in meters / second^2.
    pub fn max_drive_acceleration(&self) -> f64 {
        self.max_drive_acceleration
    }

    /// Returns the maximum speed of a drive wheel in meters / second.
    pub fn max_drive_velocity(&self) -> f64 {
        self.max_drive_velocity
    }

    /// Returns the distance between the robot center and the module that is the furthest away.
    pub fn max_module_radius(&self) -> f64 {
        self.module_offsets
            .iter()
            .map(|o| o.norm())
            .fold(0.0, f64::max)
    }

    /// Returns the maximum rotation rate of a steering axis in radians / second.
    pub fn max_steering_velocity(&self) -> f64 {
        self.max_steering_velocity
    }

    /// Returns the module positions relative to the robot center in the body frame.
    pub fn module_offsets(&self) -> &[Vector2<f64>] {
        &self.module_offsets
    }

    /// Creates a new [KinodynamicLimits] instance.
    ///
    /// ## Parameters
    ///
    /// * 'max_drive_velocity' - The maximum speed of a drive wheel
    /// * 'max_drive_acceleration' - The maximum acceleration of a drive wheel
    /// * 'max_angular_velocity' - The maximum rotation rate of the chassis
    /// * 'max_angular_acceleration' - The maximum rotational acceleration of the chassis
    /// * 'max_steering_velocity' - The maximum rotation rate of a steering axis
    /// * 'max_capsize_acceleration' - The maximum change in chassis velocity per second
    /// * 'module_offsets' - The module positions relative to the robot center
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when one of the limits is not a strictly
    ///   positive finite number, when there are fewer than two modules or when a module offset
    ///   is not finite.
    pub fn new(
        max_drive_velocity: f64,
        max_drive_acceleration: f64,
        max_angular_velocity: f64,
        max_angular_acceleration: f64,
        max_steering_velocity: f64,
        max_capsize_acceleration: f64,
        module_offsets: Vec<Vector2<f64>>,
    ) -> Result<Self, Error> {
        require_positive("max_drive_velocity", max_drive_velocity)?;
        require_positive("max_drive_acceleration", max_drive_acceleration)?;
        require_positive("max_angular_velocity", max_angular_velocity)?;
        require_positive("max_angular_acceleration", max_angular_acceleration)?;
        require_positive("max_steering_velocity", max_steering_velocity)?;
        require_positive("max_capsize_acceleration", max_capsize_acceleration)?;

        if module_offsets.len() < MIN_NUMBER_OF_MODULES {
            return Err(Error::InvalidConfiguration {
                name: "module_offsets".to_string(),
                reason: format!(
                    "at least {} modules are required, got {}",
                    MIN_NUMBER_OF_MODULES,
                    module_offsets.len()
                ),
            });
        }

        if let Some(index) = module_offsets
            .iter()
            .position(|o| !(o.x.is_finite() && o.y.is_finite()))
        {
            return Err(Error::InvalidConfiguration {
                name: format!("module_offsets[{}]", index),
                reason: "the offset must be finite".to_string(),
            });
        }

        Ok(Self {
            max_drive_velocity,
            max_drive_acceleration,
            max_angular_velocity,
            max_angular_acceleration,
            max_steering_velocity,
            max_capsize_acceleration,
            module_offsets,
        })
    }

    /// Returns the number of modules of the drivetrain.
    pub fn number_of_modules(&self) -> usize {
        self.module_offsets.len()
    }

    /// Returns the profile constraints for rotating the chassis.
    pub fn angular_constraints(&self) -> ProfileConstraints {
        ProfileConstraints::new(self.max_angular_velocity, self.max_angular_acceleration, None)
    }

    /// Returns the profile constraints for translating the chassis along one axis.
    pub fn drive_constraints(&self) -> ProfileConstraints {
        ProfileConstraints::new(self.max_drive_velocity, self.max_drive_acceleration, None)
    }
}

/// Returns an error if the given value is not a strictly positive, finite, number.
fn require_positive(name: &str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            name: name.to_string(),
            reason: format!("expected a positive finite value, got {}", value),
        })
    }
}
