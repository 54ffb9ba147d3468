//! A path with a time and a speed assigned to every point.

use log::warn;

use crate::motion_state::{FieldRelativeVelocity, MotionState1D, SwerveState};

use super::path::PathPoint;

#[cfg(test)]
#[path = "timed_trajectory_tests.rs"]
mod timed_trajectory_tests;

/// A point on a [Trajectory].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrajectorySample {
    time: f64,
    point: PathPoint,
    velocity: f64,
    acceleration: f64,
}

impl TrajectorySample {
    /// Returns the field relative accelerations `(ax, ay, alpha)` of the robot.
    ///
    /// The acceleration consists of the tangential acceleration along the path and the
    /// centripetal acceleration due to the curvature of the path.
    pub fn accelerations(&self) -> (f64, f64, f64) {
        let (sin, cos) = self.point.course().sin_cos();
        let lateral = self.velocity * self.velocity * self.point.curvature();
        (
            self.acceleration * cos - lateral * sin,
            self.acceleration * sin + lateral * cos,
            self.point.heading_rate() * self.acceleration,
        )
    }

    /// Returns the tangential acceleration along the path in meters / second^2.
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    /// Returns the field relative velocity of the robot.
    pub fn field_velocity(&self) -> FieldRelativeVelocity {
        let (sin, cos) = self.point.course().sin_cos();
        FieldRelativeVelocity::new(
            self.velocity * cos,
            self.velocity * sin,
            self.point.heading_rate() * self.velocity,
        )
    }

    /// Creates a new [TrajectorySample].
    ///
    /// ## Parameters
    ///
    /// * 'time' - The time since the start of the trajectory in seconds
    /// * 'point' - The point on the path
    /// * 'velocity' - The speed along the path in meters / second
    /// * 'acceleration' - The tangential acceleration in meters / second^2
    pub fn new(time: f64, point: PathPoint, velocity: f64, acceleration: f64) -> Self {
        Self {
            time,
            point,
            velocity,
            acceleration,
        }
    }

    /// Returns the point on the path.
    pub fn point(&self) -> &PathPoint {
        &self.point
    }

    /// Returns the time since the start of the trajectory in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns the state of the robot at this sample, including the feedforward velocity and
    /// acceleration for each axis.
    pub fn to_swerve_state(&self) -> SwerveState {
        let pose = self.point.pose();
        let velocity = self.field_velocity();
        let (ax, ay, alpha) = self.accelerations();

        SwerveState::new(
            MotionState1D::with_acceleration(pose.x(), velocity.vx(), ax),
            MotionState1D::with_acceleration(pose.y(), velocity.vy(), ay),
            MotionState1D::with_acceleration(pose.heading(), velocity.omega(), alpha),
        )
    }

    /// Returns the speed along the path in meters / second.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }
}

/// A time indexed trajectory.
///
/// Between two samples the speed changes with constant acceleration. Sampling does not change
/// the trajectory, so a trajectory can be followed again from the start.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    /// Returns the time it takes to follow the trajectory in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.last().map(|s| s.time()).unwrap_or(0.0)
    }

    /// Returns a value indicating whether the trajectory has no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub(crate) fn new(samples: Vec<TrajectorySample>) -> Self {
        Self { samples }
    }

    /// Returns the reference state of the robot at the given time.
    pub fn reference(&self, t: f64) -> SwerveState {
        self.sample(t).to_swerve_state()
    }

    /// Returns the state of the trajectory at the given time.
    ///
    /// Times before the start return the first sample, times after the end return the last
    /// sample.
    pub fn sample(&self, t: f64) -> TrajectorySample {
        let (first, last) = match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return TrajectorySample::default(),
        };

        if t.is_nan() || t <= first.time() {
            return first;
        }

        if t >= last.time() {
            return last;
        }

        let index = self.samples.partition_point(|s| s.time() <= t);
        let start = self.samples[index - 1];
        let end = self.samples[index];

        let tau = t - start.time();
        let velocity = start.velocity() + start.acceleration() * tau;
        let travelled = start.velocity() * tau + 0.5 * start.acceleration() * tau * tau;
        let length = end.point().distance() - start.point().distance();
        let fraction = if length > 0.0 {
            (travelled / length).clamp(0.0, 1.0)
        } else {
            0.0
        };

        TrajectorySample::new(
            t,
            start.point().interpolate(end.point(), fraction),
            velocity.max(0.0),
            start.acceleration(),
        )
    }

    /// Returns samples of the trajectory at a fixed time interval, including the final sample.
    ///
    /// ## Parameters
    ///
    /// * 'dt' - The time between two samples in seconds
    pub fn sample_every(&self, dt: f64) -> Vec<TrajectorySample> {
        if !(dt.is_finite() && dt > 0.0) {
            warn!("Cannot sample a trajectory every {} seconds.", dt);
            return Vec::new();
        }

        let duration = self.duration();
        let count = (duration / dt).floor() as usize;
        let mut result: Vec<TrajectorySample> =
            (0..=count).map(|i| self.sample(i as f64 * dt)).collect();

        if (count as f64) * dt < duration {
            result.push(self.sample(duration));
        }

        result
    }

    /// Returns the samples that make up the trajectory.
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }
}
