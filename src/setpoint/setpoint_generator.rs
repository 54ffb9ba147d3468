//! Produces module setpoints that the drivetrain can reach within one control period.

use std::f64::consts::FRAC_PI_2;

use log::{debug, trace, warn};
use serde::Deserialize;

use crate::{
    kinematics::{desaturate, desaturation_scale, ModuleState, SwerveKinematics},
    kinodynamics::KinodynamicLimits,
    motion_state::ChassisSpeeds,
    number_space::shortest_angular_distance,
    Error,
};

use super::{
    capsize_limiter::CapsizeAccelerationLimiter,
    drive_acceleration_limiter::DriveAccelerationLimiter,
    interpolation::flip_heading,
    steering_rate_limiter::SteeringRateLimiter,
    ModuleVelocity,
};

#[cfg(test)]
#[path = "setpoint_generator_tests.rs"]
mod setpoint_generator_tests;

/// Twists with all components below this value are treated as zero.
const TWIST_EPSILON: f64 = 1e-9;

/// The options of the [SetpointGenerator].
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
pub struct SetpointGeneratorParams {
    /// Also limit the change of the wheel speeds to the maximum drive acceleration.
    #[serde(default)]
    pub enforce_drive_acceleration: bool,
}

/// The chassis twist and the module states commanded in one control cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct SwerveSetpoint {
    chassis_speeds: ChassisSpeeds,
    module_states: Vec<ModuleState>,
}

impl SwerveSetpoint {
    /// Returns the chassis twist of the setpoint.
    pub fn chassis_speeds(&self) -> &ChassisSpeeds {
        &self.chassis_speeds
    }

    /// Returns the module states of the setpoint.
    pub fn module_states(&self) -> &[ModuleState] {
        &self.module_states
    }

    /// Creates a new [SwerveSetpoint].
    pub fn new(chassis_speeds: ChassisSpeeds, module_states: Vec<ModuleState>) -> Self {
        Self {
            chassis_speeds,
            module_states,
        }
    }

    /// Returns the setpoint with all module speeds set to zero and the module angles unchanged.
    pub fn stopped(&self) -> SwerveSetpoint {
        SwerveSetpoint::new(
            ChassisSpeeds::zero(),
            self.module_states
                .iter()
                .map(|s| ModuleState::new(0.0, s.angle()))
                .collect(),
        )
    }

    /// Returns a setpoint for a stationary robot with all modules pointing forward.
    pub fn zero(number_of_modules: usize) -> SwerveSetpoint {
        SwerveSetpoint::new(
            ChassisSpeeds::zero(),
            vec![ModuleState::default(); number_of_modules],
        )
    }
}

/// Limits the change in module states from one control cycle to the next.
///
/// Every cycle the generator interpolates from the setpoint it produced in the previous cycle
/// towards the desired twist. It moves as far as the steering rate, the capsize acceleration
/// and, if enabled, the drive acceleration allow. The generator never fails, in the worst case
/// the robot holds its current velocity while the modules steer.
#[derive(Clone, Debug, PartialEq)]
pub struct SetpointGenerator {
    kinematics: SwerveKinematics,
    max_drive_velocity: f64,
    steering_limiter: SteeringRateLimiter,
    capsize_limiter: CapsizeAccelerationLimiter,
    drive_limiter: Option<DriveAccelerationLimiter>,

    /// The control period in seconds
    period: f64,

    /// The setpoint of the previous cycle
    previous: SwerveSetpoint,

    /// The interpolant used in the last cycle
    last_s: f64,
}

impl SetpointGenerator {
    /// Returns the setpoint for this cycle and remembers it for the next cycle.
    ///
    /// ## Parameters
    ///
    /// * 'desired' - The desired chassis twist in the body frame
    pub fn generate(&mut self, desired: &ChassisSpeeds) -> SwerveSetpoint {
        let (setpoint, s) = if desired.is_finite() {
            self.generate_from(&self.previous, desired)
        } else {
            warn!(
                "Non-finite desired chassis speeds {:?}. Holding the previous setpoint.",
                desired
            );
            (self.previous.clone(), 0.0)
        };

        trace!("Setpoint: {:?}", setpoint);

        self.previous = setpoint.clone();
        self.last_s = s;
        setpoint
    }

    /// Returns the interpolant used in the last cycle.
    pub fn last_s(&self) -> f64 {
        self.last_s
    }

    /// Creates a new [SetpointGenerator] that starts with a stationary robot with all modules
    /// pointing forward.
    ///
    /// ## Parameters
    ///
    /// * 'limits' - The kinodynamic limits of the drivetrain
    /// * 'params' - The options of the generator
    /// * 'period' - The control period in seconds
    pub fn new(limits: &KinodynamicLimits, params: &SetpointGeneratorParams, period: f64) -> Self {
        Self {
            kinematics: SwerveKinematics::from_limits(limits),
            max_drive_velocity: limits.max_drive_velocity(),
            steering_limiter: SteeringRateLimiter::new(limits),
            capsize_limiter: CapsizeAccelerationLimiter::new(limits),
            drive_limiter: if params.enforce_drive_acceleration {
                Some(DriveAccelerationLimiter::new(limits))
            } else {
                None
            },
            period,
            previous: SwerveSetpoint::zero(limits.number_of_modules()),
            last_s: 1.0,
        }
    }

    /// Returns the setpoint of the previous cycle.
    pub fn previous_setpoint(&self) -> &SwerveSetpoint {
        &self.previous
    }

    /// Replaces the setpoint of the previous cycle, e.g. with the measured module states at the
    /// start of a command.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the setpoint does not have one state for
    ///   each module.
    pub fn reset(&mut self, setpoint: SwerveSetpoint) -> Result<(), Error> {
        if setpoint.module_states().len() != self.kinematics.number_of_modules() {
            return Err(Error::ModuleCountMismatch {
                expected: self.kinematics.number_of_modules(),
                actual: setpoint.module_states().len(),
            });
        }

        self.previous = setpoint;
        self.last_s = 1.0;
        Ok(())
    }

    fn generate_from(
        &self,
        previous: &SwerveSetpoint,
        desired: &ChassisSpeeds,
    ) -> (SwerveSetpoint, f64) {
        let previous_states = previous.module_states();
        let raw_states = match self
            .kinematics
            .to_module_states(desired, Some(previous_states))
        {
            Ok(s) => s,
            Err(e) => {
                warn!("Cannot compute the desired module states: {}. Holding.", e);
                return (previous.clone(), 0.0);
            }
        };

        let scale = desaturation_scale(&raw_states, self.max_drive_velocity);
        let mut desired = desired.scaled(scale);
        let mut desired_states = desaturate(&raw_states, self.max_drive_velocity);

        let need_to_steer = !desired.is_zero(TWIST_EPSILON);
        if !need_to_steer {
            desired = ChassisSpeeds::zero();
            desired_states = previous.stopped().module_states;
        }

        let previous_velocities: Vec<ModuleVelocity> =
            previous_states.iter().map(ModuleVelocity::from_state).collect();
        let desired_velocities: Vec<ModuleVelocity> =
            desired_states.iter().map(ModuleVelocity::from_state).collect();

        let all_modules_should_flip = previous_velocities
            .iter()
            .zip(desired_velocities.iter())
            .all(|(p, d)| shortest_angular_distance(p.heading, d.heading).abs() > FRAC_PI_2);

        if all_modules_should_flip
            && need_to_steer
            && !previous.chassis_speeds().is_zero(TWIST_EPSILON)
        {
            // Stopping, turning the modules in place and accelerating again is faster.
            debug!("All modules need to reverse. Stopping first.");
            return self.generate_from(previous, &ChassisSpeeds::zero());
        }

        let previous_speeds = previous.chassis_speeds();
        let dx = desired.vx() - previous_speeds.vx();
        let dy = desired.vy() - previous_speeds.vy();

        let steering = self.steering_limiter.enforce_steering_limit(
            &desired_states,
            previous_states,
            need_to_steer,
            &previous_velocities,
            &desired_velocities,
            self.period,
        );

        let mut min_s = steering.s;
        min_s = self
            .capsize_limiter
            .enforce_centripetal_limit(dx, dy, min_s, self.period);

        if let Some(limiter) = &self.drive_limiter {
            min_s = limiter.enforce_wheel_acceleration_limit(
                &previous_velocities,
                &desired_velocities,
                min_s,
                self.period,
            );
        }

        let min_s = min_s.clamp(0.0, 1.0);
        debug!("Setpoint interpolant s: {}", min_s);
        if min_s == 0.0 && need_to_steer {
            debug!("No feasible motion this cycle. Holding the chassis velocity.");
        }

        let speeds = previous_speeds.interpolate(&desired, min_s);
        let mut states = match self.kinematics.to_module_states(&speeds, Some(previous_states)) {
            Ok(s) => s,
            Err(e) => {
                warn!("Cannot compute the module states: {}. Holding.", e);
                return (previous.clone(), 0.0);
            }
        };

        for (i, state) in states.iter_mut().enumerate() {
            if let Some(angle) = steering.overrides[i] {
                let speed = if flip_heading(shortest_angular_distance(state.angle(), angle)) {
                    -state.speed()
                } else {
                    state.speed()
                };
                *state = ModuleState::new(speed, angle);
            }

            *state = state.optimize(previous_states[i].angle());
        }

        (SwerveSetpoint::new(speeds, states), min_s)
    }
}
