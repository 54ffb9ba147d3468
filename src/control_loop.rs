//! Runs one drive command at a time through the control pipeline.
//!
//! Every cycle the loop reads the measured state from the drivetrain, asks the active command
//! for a reference, lets the [HolonomicDriveController] compute a chassis twist and passes that
//! twist through the [SetpointGenerator] before the module states are written to the drivetrain.
//! The caller owns the timing and calls [DriveLoop::run_cycle] once per control period.

use log::{debug, info};

use crate::{
    commands::drive_command::DriveCommand,
    config::ControlConfig,
    controller::holonomic_drive_controller::{HolonomicDriveController, ReferenceTolerance},
    hardware::drivetrain_interface::DrivetrainInterface,
    motion_state::ChassisSpeeds,
    setpoint::setpoint_generator::{SetpointGenerator, SwerveSetpoint},
    Error,
};

#[cfg(test)]
#[path = "control_loop_tests.rs"]
mod control_loop_tests;

/// The outcome of a single control cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleStatus {
    /// No command was active. The robot was brought to a stop.
    Idle,

    /// The active command is still running.
    Running,

    /// The active command finished during this cycle.
    Finished,
}

/// Owns the control pipeline and the drivetrain.
pub struct DriveLoop<D: DrivetrainInterface> {
    drivetrain: D,
    controller: HolonomicDriveController,
    generator: SetpointGenerator,
    default_tolerance: ReferenceTolerance,
    period: f64,
    command: Option<Box<dyn DriveCommand>>,
}

impl<D: DrivetrainInterface> DriveLoop<D> {
    /// Returns the drivetrain.
    pub fn drivetrain(&self) -> &D {
        &self.drivetrain
    }

    /// Stops the active command, if any, and commands all modules to zero speed while keeping
    /// their angles. The state of the controller and the setpoint generator is cleared.
    ///
    /// ## Errors
    ///
    /// * [Error::HardwareDisconnected] - Returned when the stop command cannot be written.
    pub fn interrupt(&mut self) -> Result<(), Error> {
        if let Some(mut command) = self.command.take() {
            info!("Interrupting command {}", command.name());
            command.end(true);
        }

        self.controller.reset();
        let stopped = self.generator.previous_setpoint().stopped();
        self.generator.reset(stopped.clone())?;
        self.drivetrain.write(stopped.module_states())
    }

    /// Returns a value indicating whether a command is active.
    pub fn is_running(&self) -> bool {
        self.command.is_some()
    }

    /// Returns the setpoint that was written in the last cycle.
    pub fn last_setpoint(&self) -> &SwerveSetpoint {
        self.generator.previous_setpoint()
    }

    /// Creates a new [DriveLoop].
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when the configuration is not valid.
    pub fn new(config: &ControlConfig, drivetrain: D) -> Result<Self, Error> {
        config.validate()?;
        let limits = config.kinodynamic_limits()?;

        Ok(Self {
            drivetrain,
            controller: HolonomicDriveController::new(&config.controller, config.period_s)
                .with_limits(&limits),
            generator: SetpointGenerator::new(&limits, &config.setpoint, config.period_s),
            default_tolerance: config.controller.tolerance,
            period: config.period_s,
            command: None,
        })
    }

    /// Runs one control cycle.
    ///
    /// ## Errors
    ///
    /// * [Error::HardwareDisconnected] - Returned when the drivetrain cannot be read or written.
    pub fn run_cycle(&mut self) -> Result<CycleStatus, Error> {
        let measured = self.drivetrain.read()?.to_swerve_state();

        let command = match self.command.as_mut() {
            Some(c) => c,
            None => {
                let setpoint = self.generator.generate(&ChassisSpeeds::zero());
                self.drivetrain.write(setpoint.module_states())?;
                return Ok(CycleStatus::Idle);
            }
        };

        let reference = command.step(self.period, &measured);
        let speeds = self.controller.calculate(&measured, &reference);
        let setpoint = self.generator.generate(&speeds);
        self.drivetrain.write(setpoint.module_states())?;

        if command.is_finished(self.controller.at_reference()) {
            info!("Command {} finished", command.name());
            command.end(false);
            self.command = None;
            self.controller.reset();
            return Ok(CycleStatus::Finished);
        }

        Ok(CycleStatus::Running)
    }

    /// Starts a command. A command that is still active is interrupted first. The setpoint
    /// generator continues from the module states written last.
    ///
    /// ## Errors
    ///
    /// * [Error::HardwareDisconnected] - Returned when the drivetrain cannot be read or written.
    /// * [Error::ModuleCountMismatch] - Returned when the generator cannot take the last setpoint.
    /// * Any error returned by [DriveCommand::initialize].
    pub fn start(&mut self, mut command: Box<dyn DriveCommand>) -> Result<(), Error> {
        if self.command.is_some() {
            self.interrupt()?;
        }

        let measured = self.drivetrain.read()?.to_swerve_state();
        command.initialize(&measured)?;

        // The module states are not measured, the last written setpoint is the best estimate
        let previous = self.generator.previous_setpoint().clone();
        self.generator.reset(previous)?;
        self.controller.reset();
        self.controller
            .set_tolerance(command.tolerance().unwrap_or(self.default_tolerance));

        info!("Starting command {}", command.name());
        debug!("Measured state at the start: {:?}", measured);
        self.command = Some(command);
        Ok(())
    }
}
