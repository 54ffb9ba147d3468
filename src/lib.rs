#![warn(missing_docs)]

//! Motion control for a swerve (independently driven and steered wheels) robot.
//!
//! Provides the per-cycle pipeline that turns a goal or a path into feasible module
//! commands: motion profiles and time parameterized trajectories produce a reference,
//! a holonomic drive controller tracks that reference, the swerve kinematics turn the
//! resulting chassis twist into module states and the setpoint generator limits the
//! change of those module states to what the drivetrain can physically achieve in one
//! control period.

use thiserror::Error;

/// Defines different number spaces
pub mod number_space;

/// Defines the physical limits of the drivetrain
pub mod kinodynamics;

/// Defines the configuration for the control pipeline
pub mod config;

/// Defines the 1-D and chassis motion states, poses and twists
pub mod motion_state;

/// Provides 1-D motion profiles
pub mod profile;

/// Provides the inverse and forward swerve kinematics
pub mod kinematics;

/// Provides the feedback / feedforward controllers
pub mod controller;

/// Provides the rate limited setpoint generator
pub mod setpoint;

/// Provides path construction and time parameterized trajectories
pub mod trajectory;

/// Defines the interface to the drivetrain hardware
pub mod hardware;

/// Provides the drive commands that are run by the control loop
pub mod commands;

/// Provides the per-cycle control loop
pub mod control_loop;

/// Defines the different errors for the swerve drive control crate.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Returned when a configuration value is missing, negative or otherwise invalid.
    #[error("The configuration value {name} is invalid: {reason}")]
    InvalidConfiguration {
        /// The name of the invalid configuration value
        name: String,
        /// The reason the value was rejected
        reason: String,
    },

    /// Returned when the configuration could not be read or parsed.
    #[error("Cannot load the configuration: {0}")]
    ConfigurationLoad(String),

    /// Returned when a collection of module states does not match the number of modules.
    #[error("Expected {expected} modules but got {actual}")]
    ModuleCountMismatch {
        /// The number of modules of the drivetrain
        expected: usize,
        /// The number of module values that were provided
        actual: usize,
    },

    /// Returned when a path cannot be constructed from the given waypoints.
    #[error("Cannot create a path: {0}")]
    InvalidPath(String),

    /// Returned when an input value is NaN or infinite.
    #[error("Encountered a non-finite value in {0}")]
    NonFiniteValue(String),

    /// Returned when the connection to the drivetrain hardware has been lost.
    #[error("The drivetrain hardware is disconnected: {0}")]
    HardwareDisconnected(String),
}
