/// Defines the interface between the control loop and the drivetrain hardware
pub mod drivetrain_interface;
