//! Inverse and forward kinematics for a swerve drivetrain.
//!
//! The inverse kinematics compute, for each module, the velocity of the steering axis from the
//! chassis twist: `v_module = v_chassis + omega x r_module`. The forward kinematics solve the
//! over-determined inverse relation in the least squares sense.

use nalgebra::{DMatrix, DVector, Vector2};

use crate::{
    kinodynamics::KinodynamicLimits,
    motion_state::ChassisSpeeds,
    number_space::{normalize_angle, shortest_angular_distance},
    Error,
};

#[cfg(test)]
#[path = "kinematics_tests.rs"]
mod kinematics_tests;

/// Module speeds below this value are treated as stopped.
pub const MODULE_SPEED_EPSILON: f64 = 1e-9;

/// Singular values below this value are ignored when computing the forward kinematics.
const PSEUDO_INVERSE_EPSILON: f64 = 1e-12;

/// The kinematic command for a single swerve module.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ModuleState {
    speed: f64,
    angle: f64,
}

impl ModuleState {
    /// Returns the steering angle in radians, in the range (-PI, PI].
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Returns a value indicating whether the speed and angle are finite.
    pub fn is_finite(&self) -> bool {
        self.speed.is_finite() && self.angle.is_finite()
    }

    /// Creates a new [ModuleState]. The angle is normalized to the range (-PI, PI].
    ///
    /// ## Parameters
    ///
    /// * 'speed' - The signed wheel speed in meters / second
    /// * 'angle' - The steering angle in radians
    pub fn new(speed: f64, angle: f64) -> Self {
        Self {
            speed,
            angle: normalize_angle(angle),
        }
    }

    /// Returns the state that drives the wheel in the same direction while steering the
    /// shortest way from `previous_angle`.
    ///
    /// If the angle differs more than a quarter turn from the previous angle the wheel is
    /// reversed and steered to the opposite angle instead.
    pub fn optimize(&self, previous_angle: f64) -> ModuleState {
        let delta = shortest_angular_distance(previous_angle, self.angle);
        if delta.abs() > std::f64::consts::FRAC_PI_2 {
            self.flipped()
        } else {
            *self
        }
    }

    /// Returns the equivalent state that points the other way with the opposite speed.
    pub fn flipped(&self) -> ModuleState {
        ModuleState::new(-self.speed, self.angle + std::f64::consts::PI)
    }

    /// Returns the signed wheel speed in meters / second.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Returns the velocity of the steering axis as a vector in the body frame.
    pub fn velocity(&self) -> Vector2<f64> {
        Vector2::new(self.speed * self.angle.cos(), self.speed * self.angle.sin())
    }
}

/// Scales all module speeds by the same factor so that none of them exceeds `max_speed`.
///
/// The steering angles, and thus the direction of travel, are unchanged.
pub fn desaturate(states: &[ModuleState], max_speed: f64) -> Vec<ModuleState> {
    let scale = desaturation_scale(states, max_speed);
    if scale >= 1.0 {
        return states.to_vec();
    }

    states
        .iter()
        .map(|s| ModuleState {
            speed: s.speed() * scale,
            angle: s.angle(),
        })
        .collect()
}

/// Returns the factor, in [0, 1], by which all module speeds have to be scaled so that none of
/// them exceeds `max_speed`.
///
/// Because the kinematics are linear the chassis twist scales by the same factor.
pub fn desaturation_scale(states: &[ModuleState], max_speed: f64) -> f64 {
    let fastest = states.iter().map(|s| s.speed().abs()).fold(0.0, f64::max);
    if fastest <= max_speed || fastest <= 0.0 {
        1.0
    } else {
        max_speed.max(0.0) / fastest
    }
}

/// Converts between chassis twists and module states.
#[derive(Clone, Debug, PartialEq)]
pub struct SwerveKinematics {
    module_offsets: Vec<Vector2<f64>>,

    /// The least squares inverse of the matrix that maps the chassis twist onto the stacked
    /// module velocities. [None] if the module layout is degenerate.
    forward_kinematics: Option<DMatrix<f64>>,
}

impl SwerveKinematics {
    /// Creates the kinematics for the module layout described by the limits.
    pub fn from_limits(limits: &KinodynamicLimits) -> Self {
        Self::new(limits.module_offsets().to_vec())
    }

    /// Returns the number of modules.
    pub fn number_of_modules(&self) -> usize {
        self.module_offsets.len()
    }

    /// Returns the module offsets in the body frame.
    pub fn module_offsets(&self) -> &[Vector2<f64>] {
        &self.module_offsets
    }

    /// Creates the kinematics for modules at the given positions relative to the robot center.
    pub fn new(module_offsets: Vec<Vector2<f64>>) -> Self {
        let mut inverse_kinematics = DMatrix::<f64>::zeros(2 * module_offsets.len(), 3);
        for (i, offset) in module_offsets.iter().enumerate() {
            inverse_kinematics[(2 * i, 0)] = 1.0;
            inverse_kinematics[(2 * i, 2)] = -offset.y;
            inverse_kinematics[(2 * i + 1, 1)] = 1.0;
            inverse_kinematics[(2 * i + 1, 2)] = offset.x;
        }

        let forward_kinematics = inverse_kinematics
            .pseudo_inverse(PSEUDO_INVERSE_EPSILON)
            .ok();

        Self {
            module_offsets,
            forward_kinematics,
        }
    }

    /// Returns the chassis twist that best explains the given module states.
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the number of states does not match the
    ///   number of modules.
    /// * [Error::InvalidConfiguration] - Returned when the module layout has no least squares
    ///   solution.
    pub fn to_chassis_speeds(&self, states: &[ModuleState]) -> Result<ChassisSpeeds, Error> {
        self.check_module_count(states.len())?;

        let forward = self
            .forward_kinematics
            .as_ref()
            .ok_or_else(|| Error::InvalidConfiguration {
                name: "module_offsets".to_string(),
                reason: "the module layout does not allow computing the chassis twist".to_string(),
            })?;

        let mut module_velocities = DVector::<f64>::zeros(2 * states.len());
        for (i, state) in states.iter().enumerate() {
            let v = state.velocity();
            module_velocities[2 * i] = v.x;
            module_velocities[2 * i + 1] = v.y;
        }

        let twist = forward * module_velocities;
        Ok(ChassisSpeeds::new(twist[0], twist[1], twist[2]))
    }

    /// Returns the module states that produce the given chassis twist.
    ///
    /// A module whose speed is zero keeps its previous angle. When previous states are given
    /// each module is steered the shortest way from its previous angle, reversing the wheel
    /// if that is shorter.
    ///
    /// ## Parameters
    ///
    /// * 'speeds' - The chassis twist in the body frame
    /// * 'previous' - The module states of the previous cycle, if known
    ///
    /// ## Errors
    ///
    /// * [Error::ModuleCountMismatch] - Returned when the number of previous states does not
    ///   match the number of modules.
    pub fn to_module_states(
        &self,
        speeds: &ChassisSpeeds,
        previous: Option<&[ModuleState]>,
    ) -> Result<Vec<ModuleState>, Error> {
        if let Some(p) = previous {
            self.check_module_count(p.len())?;
        }

        let states = self
            .module_velocities(speeds)
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let previous_angle = previous.map(|p| p[i].angle());
                let speed = v.norm();
                if speed <= MODULE_SPEED_EPSILON {
                    return ModuleState::new(0.0, previous_angle.unwrap_or(0.0));
                }

                let state = ModuleState::new(speed, v.y.atan2(v.x));
                match previous_angle {
                    Some(angle) => state.optimize(angle),
                    None => state,
                }
            })
            .collect();

        Ok(states)
    }

    /// Returns the velocity vector of each steering axis for the given twist.
    pub fn module_velocities(&self, speeds: &ChassisSpeeds) -> Vec<Vector2<f64>> {
        self.module_offsets
            .iter()
            .map(|r| {
                Vector2::new(
                    speeds.vx() - speeds.omega() * r.y,
                    speeds.vy() + speeds.omega() * r.x,
                )
            })
            .collect()
    }

    fn check_module_count(&self, actual: usize) -> Result<(), Error> {
        if actual == self.module_offsets.len() {
            Ok(())
        } else {
            Err(Error::ModuleCountMismatch {
                expected: self.module_offsets.len(),
                actual,
            })
        }
    }
}
