//! Drives to a pose with an independent trapezoidal profile for each axis.

use log::{info, warn};

use crate::{
    kinodynamics::KinodynamicLimits,
    motion_state::{FieldRelativeVelocity, MotionState1D, Pose2d, SwerveState},
    profile::trapezoid_profile::TrapezoidProfile,
    Error,
};

use super::drive_command::{hold_reference, DriveCommand};

#[cfg(test)]
#[path = "drive_with_profile_tests.rs"]
mod drive_with_profile_tests;

/// The position and velocity tolerance of the profiles.
const PROFILE_TOLERANCE: f64 = 0.01;

/// Drives to a goal pose by re-planning a trapezoidal profile for x, y and heading every cycle.
///
/// The heading takes the short way around. The command finishes once all three profiles have
/// reached the goal and the controller is at the reference.
#[derive(Clone, Debug, PartialEq)]
pub struct DriveWithProfile {
    goal: Pose2d,
    x_profile: TrapezoidProfile,
    y_profile: TrapezoidProfile,
    theta_profile: TrapezoidProfile,
    setpoint: Option<SwerveState>,
    profile_done: bool,
}

impl DriveWithProfile {
    /// Returns the goal pose.
    pub fn goal(&self) -> &Pose2d {
        &self.goal
    }

    /// Creates a new [DriveWithProfile] command.
    ///
    /// ## Parameters
    ///
    /// * 'limits' - The limits of the drivetrain, used for the profile constraints
    /// * 'goal' - The field relative goal pose
    pub fn new(limits: &KinodynamicLimits, goal: Pose2d) -> Self {
        Self {
            goal,
            x_profile: TrapezoidProfile::new(limits.drive_constraints(), PROFILE_TOLERANCE),
            y_profile: TrapezoidProfile::new(limits.drive_constraints(), PROFILE_TOLERANCE),
            theta_profile: TrapezoidProfile::new(limits.angular_constraints(), PROFILE_TOLERANCE),
            setpoint: None,
            profile_done: false,
        }
    }

    fn goal_near(&self, heading: f64) -> Pose2d {
        let goal = SwerveState::from_pose_and_velocity(&self.goal, &FieldRelativeVelocity::zero());
        goal.with_heading_near(heading).pose()
    }
}

fn reached(state: &MotionState1D, goal: &MotionState1D) -> bool {
    state.position() == goal.position() && state.velocity() == goal.velocity()
}

impl DriveCommand for DriveWithProfile {
    #[cfg_attr(test, mutants::skip)] // Only logs
    fn end(&mut self, interrupted: bool) {
        info!(
            "Drive with profile to {:?} ended, interrupted: {}",
            self.goal, interrupted
        );
    }

    fn initialize(&mut self, measured: &SwerveState) -> Result<(), Error> {
        if !(measured.is_finite() && self.goal.is_finite()) {
            return Err(Error::NonFiniteValue(
                "the start or goal of the profile".to_string(),
            ));
        }

        self.setpoint = Some(*measured);
        self.profile_done = false;
        Ok(())
    }

    fn is_finished(&self, at_reference: bool) -> bool {
        self.profile_done && at_reference
    }

    fn name(&self) -> &str {
        "drive_with_profile"
    }

    fn step(&mut self, dt: f64, measured: &SwerveState) -> SwerveState {
        let setpoint = match self.setpoint {
            Some(s) => s,
            None => return hold_reference(measured),
        };

        if !measured.is_finite() {
            warn!(
                "Non-finite measurement {:?}. Holding the profile setpoint.",
                measured
            );
            return setpoint;
        }

        // Keep the heading setpoint and goal on the same turn as the measurement
        let heading = measured.theta().position();
        let setpoint = setpoint.with_heading_near(heading);
        let theta_setpoint =
            MotionState1D::new(setpoint.theta().position(), setpoint.theta().velocity());
        let theta_goal = MotionState1D::at_rest(self.goal_near(heading).heading());
        let x_goal = MotionState1D::at_rest(self.goal.x());
        let y_goal = MotionState1D::at_rest(self.goal.y());

        let x = self.x_profile.calculate(dt, setpoint.x(), &x_goal);
        let y = self.y_profile.calculate(dt, setpoint.y(), &y_goal);
        let theta = self.theta_profile.calculate(dt, &theta_setpoint, &theta_goal);

        self.profile_done = reached(&x, &x_goal) && reached(&y, &y_goal) && reached(&theta, &theta_goal);

        let reference = SwerveState::new(x, y, theta);
        self.setpoint = Some(reference);
        reference
    }
}
