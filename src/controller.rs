//! Feedback and feedforward controllers.
//!
//! The [HolonomicDriveController](holonomic_drive_controller::HolonomicDriveController) combines
//! the velocity of the reference with the output of one
//! [PidController](pid_controller::PidController) per chassis axis.

/// Provides the single axis PID controller
pub mod pid_controller;

/// Provides the chassis level reference tracking controller
pub mod holonomic_drive_controller;
