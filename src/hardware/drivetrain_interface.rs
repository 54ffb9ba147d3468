//! Defines the interface for the drivetrain hardware

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use log::warn;

use crate::{kinematics::ModuleState, motion_state::CurrentState, Error};

#[cfg(test)]
#[path = "drivetrain_interface_tests.rs"]
mod drivetrain_interface_tests;

/// Defines the interface for the hardware that measures the state of the robot and drives the
/// modules.
pub trait DrivetrainInterface {
    /// Returns the most recent measured state of the robot.
    ///
    /// ## Errors
    ///
    /// * [Error::HardwareDisconnected] - Returned when the hardware can no longer be reached.
    fn read(&mut self) -> Result<CurrentState, Error>;

    /// Sends the module states to the hardware.
    ///
    /// ## Errors
    ///
    /// * [Error::HardwareDisconnected] - Returned when the hardware can no longer be reached.
    /// * [Error::ModuleCountMismatch] - Returned when there is not one state for each module.
    fn write(&mut self, states: &[ModuleState]) -> Result<(), Error>;
}

/// The hardware side of a [ChannelDrivetrain].
pub struct HardwareChannels {
    /// Used by the hardware to send the measured state of the robot.
    pub measurement_sender: Sender<CurrentState>,

    /// Used by the hardware to receive the module commands.
    pub command_receiver: Receiver<Vec<ModuleState>>,
}

/// A [DrivetrainInterface] that exchanges measurements and commands with the hardware over
/// channels.
///
/// Reading never blocks. All measurements that arrived since the last read are drained and the
/// newest one is returned. When no new measurement arrived the previous one is returned again.
pub struct ChannelDrivetrain {
    measurement_receiver: Receiver<CurrentState>,
    command_sender: Sender<Vec<ModuleState>>,
    last_measurement: Option<CurrentState>,
    number_of_modules: usize,
}

impl ChannelDrivetrain {
    /// Creates a new [ChannelDrivetrain] and returns the channel ends for the hardware.
    ///
    /// ## Parameters
    ///
    /// * 'number_of_modules' - The number of modules of the drivetrain
    pub fn new(number_of_modules: usize) -> (Self, HardwareChannels) {
        let (measurement_sender, measurement_receiver) = crossbeam_channel::unbounded();
        let (command_sender, command_receiver) = crossbeam_channel::unbounded();

        (
            Self {
                measurement_receiver,
                command_sender,
                last_measurement: None,
                number_of_modules,
            },
            HardwareChannels {
                measurement_sender,
                command_receiver,
            },
        )
    }
}

impl DrivetrainInterface for ChannelDrivetrain {
    fn read(&mut self) -> Result<CurrentState, Error> {
        loop {
            match self.measurement_receiver.try_recv() {
                Ok(measurement) => self.last_measurement = Some(measurement),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("The measurement channel of the drivetrain is disconnected.");
                    return Err(Error::HardwareDisconnected(
                        "the measurement channel is closed".to_string(),
                    ));
                }
            }
        }

        self.last_measurement.ok_or_else(|| {
            Error::HardwareDisconnected("no measurement has been received yet".to_string())
        })
    }

    fn write(&mut self, states: &[ModuleState]) -> Result<(), Error> {
        if states.len() != self.number_of_modules {
            return Err(Error::ModuleCountMismatch {
                expected: self.number_of_modules,
                actual: states.len(),
            });
        }

        self.command_sender.send(states.to_vec()).map_err(|_| {
            warn!("The command channel of the drivetrain is disconnected.");
            Error::HardwareDisconnected("the command channel is closed".to_string())
        })
    }
}
