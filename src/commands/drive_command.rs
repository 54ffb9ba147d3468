use crate::{
    controller::holonomic_drive_controller::ReferenceTolerance,
    motion_state::{MotionState1D, SwerveState},
    Error,
};

/// Defines the life cycle of a drive command.
pub trait DriveCommand: Send {
    /// Finishes the command.
    ///
    /// ## Parameters
    ///
    /// * 'interrupted' - Indicates if the command was stopped before it finished
    fn end(&mut self, interrupted: bool);

    /// Prepares the command for running, starting from the measured state of the robot.
    ///
    /// ## Errors
    ///
    /// Returns an error when the command cannot be run from the measured state.
    fn initialize(&mut self, measured: &SwerveState) -> Result<(), Error>;

    /// Returns a value indicating whether the command is done.
    ///
    /// ## Parameters
    ///
    /// * 'at_reference' - Indicates if the controller is within tolerance of the last reference
    fn is_finished(&self, at_reference: bool) -> bool;

    /// Returns the name of the command.
    fn name(&self) -> &str;

    /// Advances the command by one control cycle and returns the reference for that cycle.
    ///
    /// ## Parameters
    ///
    /// * 'dt' - The control period in seconds
    /// * 'measured' - The measured state of the robot
    fn step(&mut self, dt: f64, measured: &SwerveState) -> SwerveState;

    /// Returns the tolerances the controller should use while this command runs, or [None] to
    /// use the configured tolerances.
    fn tolerance(&self) -> Option<ReferenceTolerance> {
        None
    }
}

/// Returns a reference that keeps the robot stationary at the measured pose.
pub fn hold_reference(measured: &SwerveState) -> SwerveState {
    SwerveState::new(
        MotionState1D::at_rest(measured.x().position()),
        MotionState1D::at_rest(measured.y().position()),
        MotionState1D::at_rest(measured.theta().position()),
    )
}
