//! Rotates the robot in place along a timed heading profile.

use log::{debug, info};

use crate::{
    controller::holonomic_drive_controller::ReferenceTolerance,
    kinodynamics::KinodynamicLimits,
    motion_state::{MotionState1D, SwerveState},
    number_space::shortest_angular_distance,
    profile::{motion_profile::MotionProfile, ProfileConstraints},
    Error,
};

use super::drive_command::{hold_reference, DriveCommand};

#[cfg(test)]
#[path = "rotate_tests.rs"]
mod rotate_tests;

/// The heading tolerance in radians, and the rotation rate tolerance in radians / second.
const HEADING_TOLERANCE: f64 = 0.003;

/// The position and velocity tolerance while rotating in place.
const TRANSLATION_TOLERANCE: f64 = 0.1;

/// Rotates the robot to a heading while it holds its position.
///
/// The heading profile is planned once, when the command is initialized, and is then followed
/// by time. The profile is jerk limited when the robot starts at rest.
#[derive(Clone, Debug, PartialEq)]
pub struct Rotate {
    target_heading: f64,
    constraints: ProfileConstraints,
    profile: Option<MotionProfile>,
    time: f64,
}

impl Rotate {
    /// Creates a new [Rotate] command.
    ///
    /// ## Parameters
    ///
    /// * 'limits' - The limits of the drivetrain
    /// * 'target_heading' - The field relative heading to rotate to, in radians
    /// * 'max_angular_jerk' - The maximum angular jerk in radians / second^3
    pub fn new(limits: &KinodynamicLimits, target_heading: f64, max_angular_jerk: f64) -> Self {
        let angular = limits.angular_constraints();
        Self {
            target_heading,
            constraints: ProfileConstraints::new(
                angular.max_velocity(),
                angular.max_acceleration(),
                Some(max_angular_jerk),
            ),
            profile: None,
            time: 0.0,
        }
    }

    /// Returns the heading profile, if the command has been initialized.
    pub fn profile(&self) -> Option<&MotionProfile> {
        self.profile.as_ref()
    }
}

impl DriveCommand for Rotate {
    #[cfg_attr(test, mutants::skip)] // Only logs
    fn end(&mut self, interrupted: bool) {
        info!(
            "Rotate to {} ended after {} s, interrupted: {}",
            self.target_heading, self.time, interrupted
        );
    }

    fn initialize(&mut self, measured: &SwerveState) -> Result<(), Error> {
        if !(measured.is_finite() && self.target_heading.is_finite()) {
            return Err(Error::NonFiniteValue(
                "the start or target heading of the rotation".to_string(),
            ));
        }

        let start = MotionState1D::new(measured.theta().position(), measured.theta().velocity());
        let goal = MotionState1D::at_rest(
            start.position() + shortest_angular_distance(start.position(), self.target_heading),
        );

        let profile = MotionProfile::generate(&start, &goal, &self.constraints);
        debug!("Rotating from {:?} to {:?} in {} s", start, goal, profile.duration());

        self.profile = Some(profile);
        self.time = 0.0;
        Ok(())
    }

    fn is_finished(&self, at_reference: bool) -> bool {
        match &self.profile {
            Some(p) => self.time > p.duration() && at_reference,
            None => false,
        }
    }

    fn name(&self) -> &str {
        "rotate"
    }

    fn step(&mut self, dt: f64, measured: &SwerveState) -> SwerveState {
        let hold = hold_reference(measured);
        match &self.profile {
            Some(p) => {
                self.time += dt;
                SwerveState::new(*hold.x(), *hold.y(), p.get(self.time))
            }
            None => hold,
        }
    }

    fn tolerance(&self) -> Option<ReferenceTolerance> {
        Some(ReferenceTolerance {
            position: TRANSLATION_TOLERANCE,
            velocity: TRANSLATION_TOLERANCE,
            heading: HEADING_TOLERANCE,
            angular_velocity: HEADING_TOLERANCE,
        })
    }
}
