//! A PID controller with a fixed control period.

use serde::Deserialize;

#[cfg(test)]
#[path = "pid_controller_tests.rs"]
mod pid_controller_tests;

fn default_integral_limit() -> f64 {
    1.0
}

/// The gains of a [PidController].
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    #[serde(default)]
    pub k_i: f64,

    /// Derivative gain
    #[serde(default)]
    pub k_d: f64,

    /// The maximum magnitude of the accumulated integral.
    #[serde(default = "default_integral_limit")]
    pub integral_limit: f64,
}

impl PidGains {
    /// Creates gains for a proportional only controller.
    pub fn proportional(k_p: f64) -> Self {
        Self {
            k_p,
            k_i: 0.0,
            k_d: 0.0,
            integral_limit: default_integral_limit(),
        }
    }
}

/// A PID controller
///
/// The controller is called exactly once per control period, so the period is fixed at
/// construction instead of being measured.
#[derive(Clone, Debug, PartialEq)]
pub struct PidController {
    gains: PidGains,

    /// The control period in seconds
    period: f64,

    /// Previous error, [None] directly after creation or reset
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

impl PidController {
    /// Returns the controller output for the given error.
    ///
    /// The integral is clamped to the integral limit of the gains. The first call after
    /// creation or a reset has no derivative contribution.
    pub fn calculate(&mut self, error: f64) -> f64 {
        let limit = self.gains.integral_limit.abs();
        self.integral = (self.integral + error * self.period).clamp(-limit, limit);

        let derivative = match self.prev_error {
            Some(e) => (error - e) / self.period,
            None => 0.0,
        };

        self.prev_error = Some(error);

        self.gains.k_p * error + self.gains.k_i * self.integral + self.gains.k_d * derivative
    }

    /// Returns the gains of the controller.
    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    /// Returns the accumulated integral.
    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Create a new controller with the given gains.
    ///
    /// ## Parameters
    ///
    /// * 'gains' - The controller gains
    /// * 'period' - The time between two calls to [PidController::calculate] in seconds
    pub fn new(gains: PidGains, period: f64) -> Self {
        Self {
            gains,
            period,
            prev_error: None,
            integral: 0.0,
        }
    }

    /// Clears the integral and the derivative state.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }
}
