//! Number spaces and their behaviour at the boundaries.
//!
//! A linear space is unbounded and never wraps: getting from one value to another means passing
//! every value in between. A periodic space wraps around after a full turn, so two values are
//! connected both forwards and backwards across the boundary. Steering angles and the chassis
//! heading live in a periodic space.
//!
//! The angular space is half-open at the start: a space that starts at -[PI](core::f64::consts::PI)
//! contains the values in (-PI, PI]. All module angles and headings in this crate are normalized
//! to that range with [normalize_angle()].

use std::f64::consts::PI;

#[cfg(test)]
#[path = "number_space_tests.rs"]
mod number_space_tests;

/// The size of a full revolution in radians.
const FULL_TURN: f64 = 2.0 * PI;

/// Defines the different kinds of number spaces available.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumberSpaceType {
    /// Indicates that a number space is a linear number space where numbers sequentially
    /// increase from -infinity to +infinity.
    LinearUnlimited,

    /// Indicates that a number space is an angular number space where numbers sequentially
    /// increase from just after the start angle up to and including the start angle + 2 PI.
    AngularLimited {
        /// The starting angle in radians
        start_angle_in_radians: f64,
    },
}

/// Defines an abstraction over number spaces
pub trait RealNumberValueSpace {
    /// Returns all possible distances between two values in the space.
    ///
    /// For unbounded value spaces there will only be one distance, but for periodic value
    /// spaces there are two, one going forward and one going backward.
    ///
    /// ## Parameters
    ///
    /// * `start` - The starting value
    /// * `end` - The ending value
    ///
    /// ## Example
    ///
    /// ```
    /// use core::f64::consts::PI;
    /// use swerve_drive_control::number_space::{ NumberSpaceType, to_number_space, RealNumberValueSpace };
    ///
    /// let space = to_number_space(NumberSpaceType::LinearUnlimited);
    /// assert_eq!(vec![1.0], space.distance_between_values(1.0, 2.0));
    ///
    /// let space = to_number_space(NumberSpaceType::AngularLimited { start_angle_in_radians: -PI });
    /// let angular_distances = space.distance_between_values(0.0, 0.5 * PI);
    /// assert_eq!(2, angular_distances.len());
    /// assert_eq!(0.5 * PI, angular_distances[0]);
    /// assert_eq!(-1.5 * PI, angular_distances[1]);
    /// ```
    fn distance_between_values(&self, start: f64, end: f64) -> Vec<f64>;

    /// Returns the value in the space that is equivalent to the given value.
    ///
    /// ## Parameters
    ///
    /// * `value` - The value that should be normalized.
    fn normalize_value(&self, value: f64) -> f64;

    /// Returns the smallest signed distance between two values in the number space.
    ///
    /// For a periodic number space the distance across a boundary may be shorter than the
    /// direct distance. A distance of exactly half a period is reported as positive.
    ///
    /// ## Parameters
    ///
    /// * `start` - The starting value.
    /// * `end` - The ending value
    fn smallest_distance_between_values(&self, start: f64, end: f64) -> f64;
}

/// Defines a linear unbounded number space with no boundaries
pub(crate) struct LinearUnboundedSpace {}

impl LinearUnboundedSpace {
    pub fn new() -> LinearUnboundedSpace {
        LinearUnboundedSpace {}
    }
}

impl RealNumberValueSpace for LinearUnboundedSpace {
    fn distance_between_values(&self, start: f64, end: f64) -> Vec<f64> {
        vec![end - start]
    }

    fn normalize_value(&self, value: f64) -> f64 {
        value
    }

    fn smallest_distance_between_values(&self, start: f64, end: f64) -> f64 {
        end - start
    }
}

/// Defines a periodic number space that wraps around every full turn.
pub(crate) struct PeriodicBoundedCircularSpace {
    range_start_in_radians: f64,
}

impl PeriodicBoundedCircularSpace {
    pub fn new_with_two_pi_range(start_angle_in_radians: f64) -> PeriodicBoundedCircularSpace {
        PeriodicBoundedCircularSpace {
            range_start_in_radians: start_angle_in_radians,
        }
    }
}

impl RealNumberValueSpace for PeriodicBoundedCircularSpace {
    fn distance_between_values(&self, start: f64, end: f64) -> Vec<f64> {
        let diff = (end - start).rem_euclid(FULL_TURN);
        if diff == 0.0 {
            vec![0.0, -FULL_TURN]
        } else {
            vec![diff, diff - FULL_TURN]
        }
    }

    fn normalize_value(&self, value: f64) -> f64 {
        let offset = (value - self.range_start_in_radians).rem_euclid(FULL_TURN);

        // The start of the range is excluded, it maps onto the end of the range
        if offset == 0.0 {
            self.range_start_in_radians + FULL_TURN
        } else {
            self.range_start_in_radians + offset
        }
    }

    fn smallest_distance_between_values(&self, start: f64, end: f64) -> f64 {
        shortest_angular_distance(start, end)
    }
}

/// Returns a [RealNumberValueSpace] instance for the given number space type.
///
/// ```
/// use core::f64::consts::PI;
/// use swerve_drive_control::number_space::{ NumberSpaceType, to_number_space, RealNumberValueSpace };
///
/// let space = to_number_space(NumberSpaceType::AngularLimited { start_angle_in_radians: -PI });
/// assert_eq!(PI, space.normalize_value(-PI));
/// let distance = space.smallest_distance_between_values(0.25 * PI, -0.25 * PI);
/// assert!((distance + 0.5 * PI).abs() < 1e-12);
/// ```
pub fn to_number_space(number_space_type: NumberSpaceType) -> Box<dyn RealNumberValueSpace> {
    match number_space_type {
        NumberSpaceType::LinearUnlimited => Box::new(LinearUnboundedSpace::new()),
        NumberSpaceType::AngularLimited {
            start_angle_in_radians,
        } => Box::new(PeriodicBoundedCircularSpace::new_with_two_pi_range(
            start_angle_in_radians,
        )),
    }
}

/// Normalizes an angle to the range (-PI, PI].
///
/// Non-finite angles are returned unchanged so that the caller can detect them.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() || (angle > -PI && angle <= PI) {
        return angle;
    }

    let offset = (angle + PI).rem_euclid(FULL_TURN);
    if offset == 0.0 {
        PI
    } else {
        offset - PI
    }
}

/// Returns the signed angle, in (-PI, PI], that rotates `from` onto `to` along the
/// shortest path.
pub fn shortest_angular_distance(from: f64, to: f64) -> f64 {
    let diff = (to - from).rem_euclid(FULL_TURN);
    if diff > PI {
        diff - FULL_TURN
    } else {
        diff
    }
}
