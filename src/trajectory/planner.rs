//! Assigns speeds and times to the points of a path.

use log::{debug, warn};
use nalgebra::Vector2;
use serde::Deserialize;

use crate::{
    kinodynamics::KinodynamicLimits,
    motion_state::{Pose2d, SwerveState},
    Error,
};

use super::{
    path::{Path, PathPoint},
    timed_trajectory::{Trajectory, TrajectorySample},
    timing_constraints::{
        CentripetalConstraint, DrivetrainConstraint, FrictionConstraint, MinMaxAcceleration,
        TimingConstraint,
    },
};

#[cfg(test)]
#[path = "planner_tests.rs"]
mod planner_tests;

/// Speeds below this value are treated as standing still.
const MIN_SPEED: f64 = 1e-6;

/// The length of the tangents of a straight line path, relative to the distance between the
/// start and the goal.
const TANGENT_SCALE: f64 = 1.2;

fn default_sample_spacing() -> f64 {
    0.05
}

/// The options used when planning trajectories.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct TrajectoryConfig {
    /// The speed at the start of the trajectory in meters / second.
    #[serde(default)]
    pub start_velocity: f64,

    /// The speed at the end of the trajectory in meters / second.
    #[serde(default)]
    pub end_velocity: f64,

    /// The acceleration budget of the tires in meters / second^2.
    pub max_friction_acceleration: f64,

    /// The distance between two points of a path in meters.
    #[serde(default = "default_sample_spacing")]
    pub sample_spacing: f64,
}

impl TrajectoryConfig {
    /// Creates a new [TrajectoryConfig] for trajectories that start and end at rest.
    pub fn new(max_friction_acceleration: f64, sample_spacing: f64) -> Self {
        Self {
            start_velocity: 0.0,
            end_velocity: 0.0,
            max_friction_acceleration,
            sample_spacing,
        }
    }

    /// Checks that all values are finite and within range.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when a velocity is negative, or when the
    ///   friction acceleration or the sample spacing is not positive.
    pub fn validate(&self) -> Result<(), Error> {
        let non_negative = [
            ("trajectory.start_velocity", self.start_velocity),
            ("trajectory.end_velocity", self.end_velocity),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidConfiguration {
                    name: name.to_string(),
                    reason: format!("must be zero or positive, got {}", value),
                });
            }
        }

        let positive = [
            (
                "trajectory.max_friction_acceleration",
                self.max_friction_acceleration,
            ),
            ("trajectory.sample_spacing", self.sample_spacing),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfiguration {
                    name: name.to_string(),
                    reason: format!("must be positive, got {}", value),
                });
            }
        }

        Ok(())
    }
}

/// Creates trajectories that respect the limits of the drivetrain.
///
/// The speed at every point of the path is limited by all timing constraints. A forward pass
/// limits the acceleration from one point to the next and a backward pass limits the
/// deceleration, which results in the fastest speed profile that meets all constraints.
#[derive(Debug)]
pub struct TrajectoryPlanner {
    config: TrajectoryConfig,
    constraints: Vec<Box<dyn TimingConstraint>>,
}

impl TrajectoryPlanner {
    /// Returns the options of the planner.
    pub fn config(&self) -> &TrajectoryConfig {
        &self.config
    }

    /// Returns a trajectory that starts at the current state of the robot and ends at rest at
    /// the goal.
    ///
    /// When the robot is moving the path leaves the start in the direction of travel, otherwise
    /// the path is a straight line.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidPath] - Returned when the start and the goal are at the same position or
    ///   when a value is not finite.
    pub fn moving_to_rest(&self, current: &SwerveState, goal: &Pose2d) -> Result<Trajectory, Error> {
        let start = current.pose();
        let direction = Vector2::new(current.x().velocity(), current.y().velocity());
        let speed = direction.norm();
        if !(speed.is_finite() && speed >= MIN_SPEED) {
            return self.rest_to_rest(&start, goal);
        }

        let offset = goal.translation() - start.translation();
        let distance = offset.norm();
        if distance < MIN_SPEED {
            return Err(Error::InvalidPath(
                "the goal is at the current position".to_string(),
            ));
        }

        let scale = TANGENT_SCALE * distance;
        let path = Path::from_control_vectors(
            &start,
            direction / speed * scale,
            goal,
            offset / distance * scale,
            self.config.sample_spacing,
        )?;

        self.plan_with_velocities(&path, speed, 0.0)
    }

    /// Creates a new [TrajectoryPlanner] with the centripetal, drivetrain and friction
    /// constraints.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidConfiguration] - Returned when the configuration is not valid.
    pub fn new(limits: &KinodynamicLimits, config: TrajectoryConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            config,
            constraints: vec![
                Box::new(CentripetalConstraint::new(limits.max_capsize_acceleration())),
                Box::new(DrivetrainConstraint::new(limits)),
                Box::new(FrictionConstraint::new(config.max_friction_acceleration)),
            ],
        })
    }

    /// Returns a trajectory along the path using the configured start and end velocities.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidPath] - Returned when the path has fewer than two points or cannot be
    ///   traversed with the constraints.
    pub fn plan(&self, path: &Path) -> Result<Trajectory, Error> {
        self.plan_with_velocities(path, self.config.start_velocity, self.config.end_velocity)
    }

    /// Returns a trajectory through the given waypoints.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidPath] - Returned when no path can be created through the waypoints.
    pub fn plan_waypoints(&self, waypoints: &[Pose2d]) -> Result<Trajectory, Error> {
        let path = Path::from_waypoints(waypoints, self.config.sample_spacing)?;
        self.plan(&path)
    }

    /// Returns a trajectory along the path that starts and ends with the given speeds.
    ///
    /// The start and end speeds are reduced when the constraints do not allow them.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidPath] - Returned when the path has fewer than two points or cannot be
    ///   traversed with the constraints.
    /// * [Error::NonFiniteValue] - Returned when the start or end speed is not finite.
    pub fn plan_with_velocities(
        &self,
        path: &Path,
        start_velocity: f64,
        end_velocity: f64,
    ) -> Result<Trajectory, Error> {
        let points = path.points();
        if points.len() < 2 {
            return Err(Error::InvalidPath(format!(
                "a trajectory needs at least two points, got {}",
                points.len()
            )));
        }

        if !(start_velocity.is_finite() && end_velocity.is_finite()) {
            return Err(Error::NonFiniteValue("trajectory boundary velocities".to_string()));
        }

        let mut velocities: Vec<f64> = points.iter().map(|p| self.max_velocity(p)).collect();
        let last = points.len() - 1;
        velocities[0] = velocities[0].min(start_velocity.max(0.0));
        velocities[last] = velocities[last].min(end_velocity.max(0.0));

        // Forward pass
        for i in 1..=last {
            let ds = points[i].distance() - points[i - 1].distance();
            let range = self.acceleration_range(&points[i - 1], velocities[i - 1]);
            let reachable =
                (velocities[i - 1] * velocities[i - 1] + 2.0 * range.max.max(0.0) * ds).sqrt();
            velocities[i] = velocities[i].min(reachable);
        }

        // Backward pass
        for i in (0..last).rev() {
            let ds = points[i + 1].distance() - points[i].distance();
            let range = self.acceleration_range(&points[i + 1], velocities[i + 1]);
            let reachable =
                (velocities[i + 1] * velocities[i + 1] - 2.0 * range.min.min(0.0) * ds).sqrt();
            velocities[i] = velocities[i].min(reachable);
        }

        if velocities[0] < start_velocity - MIN_SPEED {
            debug!(
                "Reduced the start velocity from {} to {} to meet the constraints.",
                start_velocity, velocities[0]
            );
        }

        let mut samples = Vec::with_capacity(points.len());
        let mut time = 0.0;
        for i in 0..last {
            let ds = points[i + 1].distance() - points[i].distance();
            let v0 = velocities[i];
            let v1 = velocities[i + 1];
            if v0 + v1 < MIN_SPEED {
                warn!(
                    "The trajectory stalls at {} m along the path.",
                    points[i].distance()
                );
                return Err(Error::InvalidPath(format!(
                    "the path cannot be traversed with the constraints at {} m",
                    points[i].distance()
                )));
            }

            let acceleration = (v1 * v1 - v0 * v0) / (2.0 * ds);
            samples.push(TrajectorySample::new(time, points[i], v0, acceleration));
            time += 2.0 * ds / (v0 + v1);
        }

        samples.push(TrajectorySample::new(time, points[last], velocities[last], 0.0));
        debug!(
            "Planned a trajectory of {} m taking {} s.",
            path.length(),
            time
        );

        Ok(Trajectory::new(samples))
    }

    /// Returns a straight line trajectory from the start to the goal, starting and ending at rest.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidPath] - Returned when the start and the goal are at the same position or
    ///   when a value is not finite.
    pub fn rest_to_rest(&self, start: &Pose2d, goal: &Pose2d) -> Result<Trajectory, Error> {
        let path = Path::from_waypoints(&[*start, *goal], self.config.sample_spacing)?;
        self.plan_with_velocities(&path, 0.0, 0.0)
    }

    /// Adds a constraint to the planner.
    pub fn with_constraint(mut self, constraint: Box<dyn TimingConstraint>) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn acceleration_range(&self, point: &PathPoint, velocity: f64) -> MinMaxAcceleration {
        self.constraints
            .iter()
            .fold(MinMaxAcceleration::unconstrained(), |range, c| {
                range.intersect(&c.min_max_acceleration(point, velocity))
            })
    }

    fn max_velocity(&self, point: &PathPoint) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.max_velocity(point))
            .fold(f64::INFINITY, f64::min)
            .max(0.0)
    }
}
