//! Loads the parameters of the control pipeline from TOML.
//!
//! The configuration is read once at startup. All values are validated while loading, so the
//! components that are created from a [ControlConfig] do not need to check them again.

use std::{fs::read_to_string, path::Path};

use log::info;
use serde::Deserialize;

use crate::{
    controller::{holonomic_drive_controller::ControllerParams, pid_controller::PidGains},
    kinodynamics::{KinodynamicLimits, KinodynamicLimitsParams},
    setpoint::setpoint_generator::SetpointGeneratorParams,
    trajectory::planner::TrajectoryConfig,
    Error,
};

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;

/// The parameters of the control pipeline.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ControlConfig {
    /// The control period in seconds.
    pub period_s: f64,

    /// The physical limits of the drivetrain.
    pub limits: KinodynamicLimitsParams,

    /// The gains and tolerances of the drive controller.
    #[serde(default)]
    pub controller: ControllerParams,

    /// The options of the setpoint generator.
    #[serde(default)]
    pub setpoint: SetpointGeneratorParams,

    /// The options of the trajectory planner.
    pub trajectory: TrajectoryConfig,
}

impl ControlConfig {
    /// Parses and validates a configuration.
    ///
    /// ## Errors
    ///
    /// * [Error::ConfigurationLoad] - Returned when the text is not a valid configuration.
    /// * [Error::InvalidConfiguration] - Returned when a value is out of range.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let config: ControlConfig =
            toml::from_str(text).map_err(|e| Error::ConfigurationLoad(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    /// Returns the validated kinodynamic limits.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when a limit is out of range.
    pub fn kinodynamic_limits(&self) -> Result<KinodynamicLimits, Error> {
        KinodynamicLimits::from_params(&self.limits)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// ## Errors
    ///
    /// * [Error::ConfigurationLoad] - Returned when the file cannot be read or is not a valid
    ///   configuration.
    /// * [Error::InvalidConfiguration] - Returned when a value is out of range.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = read_to_string(path).map_err(|e| {
            Error::ConfigurationLoad(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config = Self::from_toml_str(&text)?;
        info!("Loaded the control configuration from {}", path.display());

        Ok(config)
    }

    /// Checks that all values are within range.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when a value is out of range.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.period_s.is_finite() && self.period_s > 0.0) {
            return Err(Error::InvalidConfiguration {
                name: "period_s".to_string(),
                reason: format!("must be positive, got {}", self.period_s),
            });
        }

        self.kinodynamic_limits()?;
        validate_gains("controller.translation", &self.controller.translation)?;
        validate_gains("controller.rotation", &self.controller.rotation)?;

        let tolerance = &self.controller.tolerance;
        let tolerances = [
            ("controller.tolerance.position", tolerance.position),
            ("controller.tolerance.velocity", tolerance.velocity),
            ("controller.tolerance.heading", tolerance.heading),
            (
                "controller.tolerance.angular_velocity",
                tolerance.angular_velocity,
            ),
        ];
        for (name, value) in tolerances {
            require_non_negative(name, value)?;
        }

        self.trajectory.validate()
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfiguration {
            name: name.to_string(),
            reason: format!("must be zero or positive, got {}", value),
        })
    }
}

fn validate_gains(name: &str, gains: &PidGains) -> Result<(), Error> {
    require_non_negative(&format!("{}.k_p", name), gains.k_p)?;
    require_non_negative(&format!("{}.k_i", name), gains.k_i)?;
    require_non_negative(&format!("{}.k_d", name), gains.k_d)?;
    require_non_negative(&format!("{}.integral_limit", name), gains.integral_limit)
}
