//! Finds how far a module can move along the straight line between two velocity vectors.
//!
//! A module velocity is interpolated linearly between the previous and the desired velocity
//! vector. Quantities like the direction of travel or the wheel speed are not linear in the
//! interpolant `s`, so the largest `s` that keeps such a quantity within a step is found with a
//! bounded regula falsi search.

use std::f64::consts::PI;

use nalgebra::Vector2;

#[cfg(test)]
#[path = "interpolation_tests.rs"]
mod interpolation_tests;

/// The maximum number of refinement steps taken by [find_root].
pub const MAX_ITERATIONS: usize = 10;

/// Function values closer together than this are considered equal.
const EPSILON: f64 = 1e-9;

/// Function values smaller than this are considered to be the root.
const ROOT_EPSILON: f64 = 1e-12;

/// Returns `angle` shifted by a full turn, if needed, so that it lies within half a turn of
/// `reference`.
pub fn unwrap_angle(reference: f64, angle: f64) -> f64 {
    let diff = angle - reference;
    if diff > PI {
        angle - 2.0 * PI
    } else if diff < -PI {
        angle + 2.0 * PI
    } else {
        angle
    }
}

/// Returns a value indicating whether a rotation, in (-PI, PI], is shorter when the wheel is
/// reversed, i.e. the rotation is more than a quarter turn.
pub fn flip_heading(rotation: f64) -> bool {
    rotation.abs() > 0.5 * PI
}

/// Returns the interpolant `s`, in [0, 1], at which `func` crosses zero on the line from `start`
/// to `end`.
///
/// `f_start` and `f_end` are the function values at the end points. The search is bounded to
/// [MAX_ITERATIONS] steps. If it does not converge the lower end of the remaining bracket is
/// returned, which errs on the side of moving less.
///
/// ## Parameters
///
/// * 'func' - The function of the interpolated vector
/// * 'start' - The vector at `s = 0`
/// * 'f_start' - The value of `func` at `start`
/// * 'end' - The vector at `s = 1`
/// * 'f_end' - The value of `func` at `end`
pub fn find_root<F>(
    func: F,
    start: Vector2<f64>,
    f_start: f64,
    end: Vector2<f64>,
    f_end: f64,
) -> f64
where
    F: Fn(&Vector2<f64>) -> f64,
{
    let mut low = (0.0, start, f_start);
    let mut high = (1.0, end, f_end);

    for _ in 0..MAX_ITERATIONS {
        let (s_low, v_low, f_low) = low;
        let (s_high, v_high, f_high) = high;

        if (f_low - f_high).abs() <= EPSILON {
            return s_high;
        }

        let fraction = (-f_low / (f_high - f_low)).clamp(0.0, 1.0);
        let v_guess = v_low + (v_high - v_low) * fraction;
        let s_guess = s_low + (s_high - s_low) * fraction;
        let f_guess = func(&v_guess);

        if f_guess.abs() <= ROOT_EPSILON {
            return s_guess;
        }

        if f_low.signum() == f_guess.signum() {
            // The root lies between the guess and the upper end
            low = (s_guess, v_guess, f_guess);
        } else {
            high = (s_guess, v_guess, f_guess);
        }
    }

    low.0
}

/// Returns the largest interpolant `s` for which the direction of travel changes by at most
/// `max_deviation` radians.
///
/// ## Parameters
///
/// * 'start' - The velocity vector of the module at `s = 0`
/// * 'start_heading' - The direction of travel at `s = 0`
/// * 'end' - The velocity vector of the module at `s = 1`
/// * 'end_heading' - The direction of travel at `s = 1`
/// * 'max_deviation' - The largest allowed change in direction
pub fn find_steering_max_s(
    start: Vector2<f64>,
    start_heading: f64,
    end: Vector2<f64>,
    end_heading: f64,
    max_deviation: f64,
) -> f64 {
    let end_heading = unwrap_angle(start_heading, end_heading);
    let diff = end_heading - start_heading;
    if diff.abs() <= max_deviation {
        return 1.0;
    }

    let offset = start_heading + diff.signum() * max_deviation;
    let func = |v: &Vector2<f64>| unwrap_angle(start_heading, v.y.atan2(v.x)) - offset;
    find_root(
        func,
        start,
        start_heading - offset,
        end,
        end_heading - offset,
    )
}

/// Returns the largest interpolant `s` for which the speed of the module changes by at most
/// `max_velocity_step`.
///
/// ## Parameters
///
/// * 'start' - The velocity vector of the module at `s = 0`
/// * 'end' - The velocity vector of the module at `s = 1`
/// * 'max_velocity_step' - The largest allowed change in speed
pub fn find_drive_max_s(start: Vector2<f64>, end: Vector2<f64>, max_velocity_step: f64) -> f64 {
    let start_speed = start.norm();
    let end_speed = end.norm();
    let diff = end_speed - start_speed;
    if diff.abs() <= max_velocity_step {
        return 1.0;
    }

    let offset = start_speed + diff.signum() * max_velocity_step;
    let func = |v: &Vector2<f64>| v.norm() - offset;
    find_root(func, start, start_speed - offset, end, end_speed - offset)
}
