//! Follows a trajectory from start to end.

use log::{info, warn};

use crate::{
    motion_state::{Pose2d, SwerveState},
    trajectory::{planner::TrajectoryPlanner, timed_trajectory::Trajectory},
    Error,
};

use super::drive_command::{hold_reference, DriveCommand};

#[cfg(test)]
#[path = "follow_trajectory_tests.rs"]
mod follow_trajectory_tests;

#[derive(Debug)]
enum TrajectorySource {
    Fixed(Trajectory),
    ToPose {
        planner: TrajectoryPlanner,
        goal: Pose2d,
    },
}

/// Steps through a [Trajectory] one control period at a time.
///
/// The command finishes once the end of the trajectory has been reached and the controller is
/// at the reference.
#[derive(Debug)]
pub struct FollowTrajectory {
    source: TrajectorySource,
    trajectory: Option<Trajectory>,
    time: f64,
}

impl FollowTrajectory {
    /// Creates a command that follows the given trajectory.
    pub fn new(trajectory: Trajectory) -> Self {
        Self {
            source: TrajectorySource::Fixed(trajectory),
            trajectory: None,
            time: 0.0,
        }
    }

    /// Returns the time since the command was initialized, in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Creates a command that plans a trajectory from the measured state to the goal when it is
    /// initialized.
    pub fn to_pose(planner: TrajectoryPlanner, goal: Pose2d) -> Self {
        Self {
            source: TrajectorySource::ToPose { planner, goal },
            trajectory: None,
            time: 0.0,
        }
    }

    /// Returns the trajectory that is being followed, if the command has been initialized.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.trajectory.as_ref()
    }
}

impl DriveCommand for FollowTrajectory {
    #[cfg_attr(test, mutants::skip)] // Only logs
    fn end(&mut self, interrupted: bool) {
        info!(
            "Trajectory following ended after {} s, interrupted: {}",
            self.time, interrupted
        );
    }

    fn initialize(&mut self, measured: &SwerveState) -> Result<(), Error> {
        let trajectory = match &self.source {
            TrajectorySource::Fixed(t) => t.clone(),
            TrajectorySource::ToPose { planner, goal } => planner.moving_to_rest(measured, goal)?,
        };

        info!(
            "Following a trajectory of {} s",
            trajectory.duration()
        );
        self.trajectory = Some(trajectory);
        self.time = 0.0;
        Ok(())
    }

    fn is_finished(&self, at_reference: bool) -> bool {
        match &self.trajectory {
            Some(t) => self.time >= t.duration() && at_reference,
            None => false,
        }
    }

    fn name(&self) -> &str {
        "follow_trajectory"
    }

    fn step(&mut self, dt: f64, measured: &SwerveState) -> SwerveState {
        match &self.trajectory {
            Some(t) => {
                self.time += dt;
                t.reference(self.time)
            }
            None => {
                warn!("The trajectory command was stepped before it was initialized. Holding.");
                hold_reference(measured)
            }
        }
    }
}
