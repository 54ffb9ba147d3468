//! Defines the motion states that flow through the control pipeline.
//!
//! A [MotionState1D] describes the position, velocity and acceleration along a single axis. Three
//! of those together form a [SwerveState], which is used both for the reference that the robot
//! should follow and for the measured state of the robot. Velocities of the chassis are either
//! field relative ([FieldRelativeVelocity]) or relative to the robot body ([ChassisSpeeds]).

use nalgebra::{UnitComplex, Vector2};

use crate::number_space::{normalize_angle, shortest_angular_distance};

#[cfg(test)]
#[path = "motion_state_tests.rs"]
mod motion_state_tests;

/// Stores the position and motion state along a single axis.
///
/// The axis can be linear, in which case the values are in meters, meters / second and
/// meters / second^2, or angular, in which case the values are in radians, radians / second and
/// radians / second^2.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionState1D {
    /// The position along the axis.
    position: f64,

    /// The velocity along the axis.
    velocity: f64,

    /// The acceleration along the axis.
    acceleration: f64,
}

impl MotionState1D {
    /// Returns the acceleration along the axis.
    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    /// Returns a value indicating whether all the values are finite.
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.velocity.is_finite() && self.acceleration.is_finite()
    }

    /// Returns a value indicating whether the position and velocity of this state are within the
    /// given tolerances of the other state.
    pub fn is_near(&self, other: &MotionState1D, position_tolerance: f64, velocity_tolerance: f64) -> bool {
        (self.position - other.position).abs() <= position_tolerance
            && (self.velocity - other.velocity).abs() <= velocity_tolerance
    }

    /// Creates a new [MotionState1D] with zero acceleration.
    ///
    /// ## Parameters
    ///
    /// * 'position' - The position along the axis
    /// * 'velocity' - The velocity along the axis
    pub fn new(position: f64, velocity: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration: 0.0,
        }
    }

    /// Returns the position along the axis.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Creates a [MotionState1D] that is at rest at the given position.
    pub fn at_rest(position: f64) -> Self {
        Self::new(position, 0.0)
    }

    /// Returns the velocity along the axis.
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Creates a new [MotionState1D] with the given acceleration.
    ///
    /// ## Parameters
    ///
    /// * 'position' - The position along the axis
    /// * 'velocity' - The velocity along the axis
    /// * 'acceleration' - The acceleration along the axis
    pub fn with_acceleration(position: f64, velocity: f64, acceleration: f64) -> Self {
        Self {
            position,
            velocity,
            acceleration,
        }
    }
}

/// The position and heading of the robot in the field frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose2d {
    x: f64,
    y: f64,
    heading: f64,
}

impl Pose2d {
    /// Returns the straight line distance between the positions of two poses.
    pub fn distance_to(&self, other: &Pose2d) -> f64 {
        (other.translation() - self.translation()).norm()
    }

    /// Returns the heading of the robot in radians, in the range (-PI, PI].
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Returns a value indicating whether all the values are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.heading.is_finite()
    }

    /// Creates a new [Pose2d]. The heading is normalized to the range (-PI, PI].
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            x,
            y,
            heading: normalize_angle(heading),
        }
    }

    /// Returns the position of the robot as a vector.
    pub fn translation(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Returns the x position of the robot in meters.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Returns the y position of the robot in meters.
    pub fn y(&self) -> f64 {
        self.y
    }
}

/// The velocity of the robot expressed in the field frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldRelativeVelocity {
    vx: f64,
    vy: f64,
    omega: f64,
}

impl FieldRelativeVelocity {
    /// Returns a value indicating whether all the values are finite.
    pub fn is_finite(&self) -> bool {
        self.vx.is_finite() && self.vy.is_finite() && self.omega.is_finite()
    }

    /// Creates a new [FieldRelativeVelocity].
    ///
    /// ## Parameters
    ///
    /// * 'vx' - The velocity along the field x-axis in meters / second
    /// * 'vy' - The velocity along the field y-axis in meters / second
    /// * 'omega' - The rotation rate in radians / second
    pub fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }

    /// Returns the rotation rate in radians / second.
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Returns the speed of the robot in meters / second.
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Returns the velocity along the field x-axis in meters / second.
    pub fn vx(&self) -> f64 {
        self.vx
    }

    /// Returns the velocity along the field y-axis in meters / second.
    pub fn vy(&self) -> f64 {
        self.vy
    }

    /// Returns the zero velocity.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// The velocity of the robot expressed in the robot body frame, i.e. the twist of the chassis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ChassisSpeeds {
    vx: f64,
    vy: f64,
    omega: f64,
}

impl ChassisSpeeds {
    /// Returns the body frame speeds that match the given field relative velocity for a robot
    /// with the given heading.
    pub fn from_field_relative(velocity: &FieldRelativeVelocity, heading: f64) -> Self {
        let body = UnitComplex::new(-heading) * Vector2::new(velocity.vx(), velocity.vy());
        Self::new(body.x, body.y, velocity.omega())
    }

    /// Returns a value indicating whether all the values are finite.
    pub fn is_finite(&self) -> bool {
        self.vx.is_finite() && self.vy.is_finite() && self.omega.is_finite()
    }

    /// Returns a value indicating whether every component is within `epsilon` of zero.
    pub fn is_zero(&self, epsilon: f64) -> bool {
        self.vx.abs() <= epsilon && self.vy.abs() <= epsilon && self.omega.abs() <= epsilon
    }

    /// Returns the linear velocity as a vector.
    pub fn linear(&self) -> Vector2<f64> {
        Vector2::new(self.vx, self.vy)
    }

    /// Returns the speeds that lie a fraction `s` of the way from `self` to `other`.
    pub fn interpolate(&self, other: &ChassisSpeeds, s: f64) -> ChassisSpeeds {
        ChassisSpeeds::new(
            self.vx + s * (other.vx - self.vx),
            self.vy + s * (other.vy - self.vy),
            self.omega + s * (other.omega - self.omega),
        )
    }

    /// Creates a new [ChassisSpeeds].
    ///
    /// ## Parameters
    ///
    /// * 'vx' - The forward velocity in meters / second
    /// * 'vy' - The velocity to the left in meters / second
    /// * 'omega' - The counter clockwise rotation rate in radians / second
    pub fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }

    /// Returns the rotation rate in radians / second.
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Returns the speeds with every component multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> ChassisSpeeds {
        ChassisSpeeds::new(self.vx * factor, self.vy * factor, self.omega * factor)
    }

    /// Returns the field relative velocity for a robot with the given heading.
    pub fn to_field_relative(&self, heading: f64) -> FieldRelativeVelocity {
        let field = UnitComplex::new(heading) * self.linear();
        FieldRelativeVelocity::new(field.x, field.y, self.omega)
    }

    /// Returns the forward velocity in meters / second.
    pub fn vx(&self) -> f64 {
        self.vx
    }

    /// Returns the velocity to the left in meters / second.
    pub fn vy(&self) -> f64 {
        self.vy
    }

    /// Returns the zero twist.
    pub fn zero() -> Self {
        Self::default()
    }
}

/// The measured state of the robot as supplied by the pose estimator every cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurrentState {
    /// The pose of the robot in the field frame.
    pub pose: Pose2d,

    /// The velocity of the robot in the field frame.
    pub velocity: FieldRelativeVelocity,
}

impl CurrentState {
    /// Returns a value indicating whether all the values are finite.
    pub fn is_finite(&self) -> bool {
        self.pose.is_finite() && self.velocity.is_finite()
    }

    /// Creates a new [CurrentState].
    pub fn new(pose: Pose2d, velocity: FieldRelativeVelocity) -> Self {
        Self { pose, velocity }
    }

    /// Returns the measured state as a [SwerveState].
    pub fn to_swerve_state(&self) -> SwerveState {
        SwerveState::from_pose_and_velocity(&self.pose, &self.velocity)
    }
}

/// The full chassis state, one [MotionState1D] for each of the x, y and heading axes, all in the
/// field frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SwerveState {
    x: MotionState1D,
    y: MotionState1D,
    theta: MotionState1D,
}

impl SwerveState {
    /// Creates a [SwerveState] from a pose and a field relative velocity. The accelerations
    /// are zero.
    pub fn from_pose_and_velocity(pose: &Pose2d, velocity: &FieldRelativeVelocity) -> Self {
        Self {
            x: MotionState1D::new(pose.x(), velocity.vx()),
            y: MotionState1D::new(pose.y(), velocity.vy()),
            theta: MotionState1D::new(pose.heading(), velocity.omega()),
        }
    }

    /// Returns a value indicating whether all the values are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite()
    }

    /// Creates a new [SwerveState].
    pub fn new(x: MotionState1D, y: MotionState1D, theta: MotionState1D) -> Self {
        Self { x, y, theta }
    }

    /// Returns the pose described by the state.
    pub fn pose(&self) -> Pose2d {
        Pose2d::new(self.x.position(), self.y.position(), self.theta.position())
    }

    /// Returns the heading axis state.
    pub fn theta(&self) -> &MotionState1D {
        &self.theta
    }

    /// Returns the field relative velocity described by the state.
    pub fn velocity(&self) -> FieldRelativeVelocity {
        FieldRelativeVelocity::new(self.x.velocity(), self.y.velocity(), self.theta.velocity())
    }

    /// Returns the state with the heading position replaced by the equivalent angle closest to
    /// `reference_heading`. Used to keep heading profiles from taking the long way around.
    pub fn with_heading_near(&self, reference_heading: f64) -> SwerveState {
        let heading = reference_heading
            + shortest_angular_distance(reference_heading, self.theta.position());
        SwerveState::new(
            self.x,
            self.y,
            MotionState1D::with_acceleration(
                heading,
                self.theta.velocity(),
                self.theta.acceleration(),
            ),
        )
    }

    /// Returns the x axis state.
    pub fn x(&self) -> &MotionState1D {
        &self.x
    }

    /// Returns the y axis state.
    pub fn y(&self) -> &MotionState1D {
        &self.y
    }
}
