//! Drive commands that produce the reference for the drive controller.
//!
//! A command is a small state machine that is driven by the
//! [DriveLoop](crate::control_loop::DriveLoop): it is initialized with the measured state, asked
//! for a reference once per control cycle and ended when it finishes or is interrupted.

/// Defines the interface shared by all drive commands
pub mod drive_command;

/// Provides the command that follows a time parameterized trajectory
pub mod follow_trajectory;

/// Provides the command that drives to a pose with per-axis trapezoidal profiles
pub mod drive_with_profile;

/// Provides the command that rotates in place
pub mod rotate;
