//! Tracks a chassis reference with velocity feedforward and per-axis PID feedback.

use log::{trace, warn};
use nalgebra::Vector2;
use serde::Deserialize;

use crate::{
    kinodynamics::KinodynamicLimits,
    motion_state::{ChassisSpeeds, FieldRelativeVelocity, MotionState1D, SwerveState},
    number_space::{to_number_space, NumberSpaceType},
};

use super::pid_controller::{PidController, PidGains};

#[cfg(test)]
#[path = "holonomic_drive_controller_tests.rs"]
mod holonomic_drive_controller_tests;

/// The errors within which the robot is considered to be at the reference.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ReferenceTolerance {
    /// The maximum position error along the x and y axes in meters.
    pub position: f64,

    /// The maximum velocity error along the x and y axes in meters / second.
    pub velocity: f64,

    /// The maximum heading error in radians.
    pub heading: f64,

    /// The maximum rotation rate error in radians / second.
    pub angular_velocity: f64,
}

impl Default for ReferenceTolerance {
    fn default() -> Self {
        Self {
            position: 0.05,
            velocity: 0.05,
            heading: 0.05,
            angular_velocity: 0.05,
        }
    }
}

/// The configuration of the [HolonomicDriveController].
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct ControllerParams {
    /// The gains used for both the x and y axes.
    pub translation: PidGains,

    /// The gains used for the heading.
    pub rotation: PidGains,

    /// The tolerances used to decide if the robot is at the reference.
    #[serde(default)]
    pub tolerance: ReferenceTolerance,
}

impl Default for ControllerParams {
    fn default() -> Self {
        Self {
            translation: PidGains::proportional(2.4),
            rotation: PidGains::proportional(1.3),
            tolerance: ReferenceTolerance::default(),
        }
    }
}

/// The position and velocity error of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisError {
    /// The difference between the reference position and the measured position.
    pub position: f64,

    /// The difference between the reference velocity and the measured velocity.
    pub velocity: f64,
}

impl AxisError {
    fn is_within(&self, position_tolerance: f64, velocity_tolerance: f64) -> bool {
        self.position.abs() <= position_tolerance && self.velocity.abs() <= velocity_tolerance
    }
}

/// The controller for a single axis, together with the number space the axis lives in.
#[derive(Clone, Debug, PartialEq)]
struct AxisController {
    pid: PidController,
    space: NumberSpaceType,
}

impl AxisController {
    fn error(&self, measured: &MotionState1D, reference: &MotionState1D) -> AxisError {
        AxisError {
            position: to_number_space(self.space)
                .smallest_distance_between_values(measured.position(), reference.position()),
            velocity: reference.velocity() - measured.velocity(),
        }
    }
}

/// Tracks a [SwerveState] reference.
///
/// The command is the velocity of the reference plus the output of a PID controller on the
/// position error of each axis. The heading error is the shortest angular distance between the
/// measured and the reference heading.
#[derive(Clone, Debug, PartialEq)]
pub struct HolonomicDriveController {
    x: AxisController,
    y: AxisController,
    theta: AxisController,
    tolerance: ReferenceTolerance,

    /// The maximum linear and angular speed of the output, if limited.
    output_limits: Option<(f64, f64)>,

    /// The errors of the last calculation, [None] before the first calculation after creation
    /// or a reset.
    errors: Option<[AxisError; 3]>,
}

impl HolonomicDriveController {
    /// Returns a value indicating whether the position and velocity errors of every axis were
    /// within tolerance during the last calculation.
    ///
    /// Always false before the first calculation after creation or a reset.
    pub fn at_reference(&self) -> bool {
        match self.errors {
            Some([x, y, theta]) => {
                x.is_within(self.tolerance.position, self.tolerance.velocity)
                    && y.is_within(self.tolerance.position, self.tolerance.velocity)
                    && theta.is_within(self.tolerance.heading, self.tolerance.angular_velocity)
            }
            None => false,
        }
    }

    /// Returns the body frame velocity command that moves the robot from the measured state
    /// towards the reference state.
    ///
    /// ## Parameters
    ///
    /// * 'measured' - The measured state of the robot, in the field frame
    /// * 'reference' - The state the robot should be in, in the field frame
    pub fn calculate(&mut self, measured: &SwerveState, reference: &SwerveState) -> ChassisSpeeds {
        let field = self.calculate_field_relative(measured, reference);
        ChassisSpeeds::from_field_relative(&field, measured.theta().position())
    }

    /// Returns the field relative velocity command that moves the robot from the measured state
    /// towards the reference state.
    ///
    /// When one of the states, or the resulting command, is not finite a zero command is
    /// returned and the robot is not considered to be at the reference.
    pub fn calculate_field_relative(
        &mut self,
        measured: &SwerveState,
        reference: &SwerveState,
    ) -> FieldRelativeVelocity {
        if !(measured.is_finite() && reference.is_finite()) {
            warn!(
                "Non-finite state passed to the drive controller. Measured: {:?}, reference: {:?}. Commanding zero velocity.",
                measured, reference
            );
            self.errors = None;
            return FieldRelativeVelocity::zero();
        }

        let x_error = self.x.error(measured.x(), reference.x());
        let y_error = self.y.error(measured.y(), reference.y());
        let theta_error = self.theta.error(measured.theta(), reference.theta());

        let vx = reference.x().velocity() + self.x.pid.calculate(x_error.position);
        let vy = reference.y().velocity() + self.y.pid.calculate(y_error.position);
        let omega = reference.theta().velocity() + self.theta.pid.calculate(theta_error.position);

        let output = self.limit(FieldRelativeVelocity::new(vx, vy, omega));
        if !output.is_finite() {
            warn!(
                "The drive controller produced a non-finite command {:?}. Commanding zero velocity.",
                output
            );
            self.errors = None;
            return FieldRelativeVelocity::zero();
        }

        self.errors = Some([x_error, y_error, theta_error]);

        trace!(
            "Drive controller errors x: {:?}, y: {:?}, theta: {:?}, output: {:?}",
            x_error,
            y_error,
            theta_error,
            output
        );

        output
    }

    /// Returns the errors of the last calculation in x, y, theta order, if there was one.
    pub fn errors(&self) -> Option<[AxisError; 3]> {
        self.errors
    }

    /// Creates a new controller.
    ///
    /// ## Parameters
    ///
    /// * 'params' - The gains and tolerances of the controller
    /// * 'period' - The control period in seconds
    pub fn new(params: &ControllerParams, period: f64) -> Self {
        Self {
            x: AxisController {
                pid: PidController::new(params.translation, period),
                space: NumberSpaceType::LinearUnlimited,
            },
            y: AxisController {
                pid: PidController::new(params.translation, period),
                space: NumberSpaceType::LinearUnlimited,
            },
            theta: AxisController {
                pid: PidController::new(params.rotation, period),
                space: NumberSpaceType::AngularLimited {
                    start_angle_in_radians: -std::f64::consts::PI,
                },
            },
            tolerance: params.tolerance,
            output_limits: None,
            errors: None,
        }
    }

    /// Clears the integral and derivative state of all axes. Call this before following a new
    /// reference.
    pub fn reset(&mut self) {
        self.x.pid.reset();
        self.y.pid.reset();
        self.theta.pid.reset();
        self.errors = None;
    }

    /// Sets the tolerances used by [HolonomicDriveController::at_reference].
    pub fn set_tolerance(&mut self, tolerance: ReferenceTolerance) {
        self.tolerance = tolerance;
    }

    /// Returns the tolerances used by [HolonomicDriveController::at_reference].
    pub fn tolerance(&self) -> &ReferenceTolerance {
        &self.tolerance
    }

    /// Returns the controller with the output limited to the maximum drive and angular
    /// velocity of the drivetrain.
    pub fn with_limits(mut self, limits: &KinodynamicLimits) -> Self {
        self.output_limits = Some((limits.max_drive_velocity(), limits.max_angular_velocity()));
        self
    }

    fn limit(&self, velocity: FieldRelativeVelocity) -> FieldRelativeVelocity {
        let (max_speed, max_omega) = match self.output_limits {
            Some(l) => l,
            None => return velocity,
        };

        let mut linear = Vector2::new(velocity.vx(), velocity.vy());
        let speed = linear.norm();
        if speed > max_speed {
            linear *= max_speed / speed;
        }

        FieldRelativeVelocity::new(
            linear.x,
            linear.y,
            velocity.omega().clamp(-max_omega, max_omega),
        )
    }
}
