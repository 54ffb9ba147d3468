//! Geometric paths through a sequence of waypoints.
//!
//! Consecutive waypoints are joined by cubic Hermite splines. The tangents at the waypoints
//! follow the Catmull-Rom rule, i.e. the tangent at a waypoint is half the vector between its
//! neighbours, and at the ends it is the vector to the neighbouring waypoint. Because a swerve
//! drive can move in any direction the heading of the robot is interpolated separately, along
//! the arc length, taking the shortest way around.

use nalgebra::Vector2;

use crate::{
    motion_state::Pose2d,
    number_space::{normalize_angle, shortest_angular_distance},
    Error,
};

#[cfg(test)]
#[path = "path_tests.rs"]
mod path_tests;

/// Segments shorter than this are considered to have zero length.
const MIN_SEGMENT_LENGTH: f64 = 1e-6;

/// The number of chords used to estimate the length of a spline segment.
const LENGTH_ESTIMATE_CHORDS: usize = 32;

/// A point on a [Path].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PathPoint {
    pose: Pose2d,
    course: f64,
    curvature: f64,
    heading_rate: f64,
    distance: f64,
}

impl PathPoint {
    /// Returns the direction of travel in the field frame, in radians.
    pub fn course(&self) -> f64 {
        self.course
    }

    /// Returns the curvature of the path in 1 / meters. Positive curvature turns left.
    pub fn curvature(&self) -> f64 {
        self.curvature
    }

    /// Returns the distance along the path from the start of the path in meters.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Returns the change of the robot heading per meter travelled, in radians / meter.
    pub fn heading_rate(&self) -> f64 {
        self.heading_rate
    }

    /// Returns the point that lies a fraction `s` of the way from `self` to `other`.
    pub fn interpolate(&self, other: &PathPoint, s: f64) -> PathPoint {
        let lerp = |a: f64, b: f64| a + s * (b - a);
        PathPoint {
            pose: Pose2d::new(
                lerp(self.pose.x(), other.pose.x()),
                lerp(self.pose.y(), other.pose.y()),
                self.pose.heading()
                    + s * shortest_angular_distance(self.pose.heading(), other.pose.heading()),
            ),
            course: normalize_angle(
                self.course + s * shortest_angular_distance(self.course, other.course),
            ),
            curvature: lerp(self.curvature, other.curvature),
            heading_rate: lerp(self.heading_rate, other.heading_rate),
            distance: lerp(self.distance, other.distance),
        }
    }

    /// Creates a new [PathPoint].
    ///
    /// ## Parameters
    ///
    /// * 'pose' - The position and heading of the robot
    /// * 'course' - The direction of travel
    /// * 'curvature' - The curvature of the path
    /// * 'heading_rate' - The change of heading per meter
    /// * 'distance' - The distance from the start of the path
    pub fn new(pose: Pose2d, course: f64, curvature: f64, heading_rate: f64, distance: f64) -> Self {
        Self {
            pose,
            course: normalize_angle(course),
            curvature,
            heading_rate,
            distance,
        }
    }

    /// Returns the position and heading of the robot.
    pub fn pose(&self) -> &Pose2d {
        &self.pose
    }
}

/// A cubic Hermite spline between two points.
#[derive(Clone, Copy, Debug)]
struct HermiteSegment {
    p0: Vector2<f64>,
    p1: Vector2<f64>,
    m0: Vector2<f64>,
    m1: Vector2<f64>,
}

impl HermiteSegment {
    fn position(&self, t: f64) -> Vector2<f64> {
        let t2 = t * t;
        let t3 = t2 * t;
        self.p0 * (2.0 * t3 - 3.0 * t2 + 1.0)
            + self.m0 * (t3 - 2.0 * t2 + t)
            + self.p1 * (-2.0 * t3 + 3.0 * t2)
            + self.m1 * (t3 - t2)
    }

    fn first_derivative(&self, t: f64) -> Vector2<f64> {
        let t2 = t * t;
        self.p0 * (6.0 * t2 - 6.0 * t)
            + self.m0 * (3.0 * t2 - 4.0 * t + 1.0)
            + self.p1 * (-6.0 * t2 + 6.0 * t)
            + self.m1 * (3.0 * t2 - 2.0 * t)
    }

    fn second_derivative(&self, t: f64) -> Vector2<f64> {
        self.p0 * (12.0 * t - 6.0)
            + self.m0 * (6.0 * t - 4.0)
            + self.p1 * (-12.0 * t + 6.0)
            + self.m1 * (6.0 * t - 2.0)
    }

    fn estimated_length(&self) -> f64 {
        let mut length = 0.0;
        let mut previous = self.p0;
        for i in 1..=LENGTH_ESTIMATE_CHORDS {
            let p = self.position(i as f64 / LENGTH_ESTIMATE_CHORDS as f64);
            length += (p - previous).norm();
            previous = p;
        }

        length
    }
}

/// A sampled geometric path with the robot heading along it.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    points: Vec<PathPoint>,
}

impl Path {
    /// Creates a path from a start pose with a given tangent to an end pose with a given
    /// tangent, i.e. a single Hermite segment.
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidPath] - Returned when the poses coincide, when a value is not finite or
    ///   when the sample spacing is not positive.
    pub fn from_control_vectors(
        start: &Pose2d,
        start_tangent: Vector2<f64>,
        end: &Pose2d,
        end_tangent: Vector2<f64>,
        spacing: f64,
    ) -> Result<Self, Error> {
        if !(start_tangent.iter().all(|v| v.is_finite()) && end_tangent.iter().all(|v| v.is_finite())) {
            return Err(Error::InvalidPath("the tangents must be finite".to_string()));
        }

        let segment = HermiteSegment {
            p0: start.translation(),
            p1: end.translation(),
            m0: start_tangent,
            m1: end_tangent,
        };

        Self::from_segments(&[*start, *end], &[segment], spacing)
    }

    /// Creates a path through the given waypoints.
    ///
    /// ## Parameters
    ///
    /// * 'waypoints' - The poses the robot passes through. The headings are the robot headings,
    ///   which are independent of the direction of travel.
    /// * 'spacing' - The approximate distance between two samples of the path in meters
    ///
    /// ## Errors
    ///
    /// * [Error::InvalidPath] - Returned when there are fewer than two waypoints, when two
    ///   consecutive waypoints are at the same position, when a value is not finite or when the
    ///   sample spacing is not positive.
    pub fn from_waypoints(waypoints: &[Pose2d], spacing: f64) -> Result<Self, Error> {
        if waypoints.len() < 2 {
            return Err(Error::InvalidPath(format!(
                "at least two waypoints are required, got {}",
                waypoints.len()
            )));
        }

        let positions: Vec<Vector2<f64>> = waypoints.iter().map(|w| w.translation()).collect();
        let last = positions.len() - 1;
        let tangent = |i: usize| -> Vector2<f64> {
            if i == 0 {
                positions[1] - positions[0]
            } else if i == last {
                positions[last] - positions[last - 1]
            } else {
                (positions[i + 1] - positions[i - 1]) * 0.5
            }
        };

        let segments: Vec<HermiteSegment> = (0..last)
            .map(|i| HermiteSegment {
                p0: positions[i],
                p1: positions[i + 1],
                m0: tangent(i),
                m1: tangent(i + 1),
            })
            .collect();

        Self::from_segments(waypoints, &segments, spacing)
    }

    /// Returns a value indicating whether the path has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the length of the path in meters.
    pub fn length(&self) -> f64 {
        self.points.last().map(|p| p.distance()).unwrap_or(0.0)
    }

    /// Returns the number of points on the path.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns the points on the path, ordered by distance.
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    fn from_segments(
        waypoints: &[Pose2d],
        segments: &[HermiteSegment],
        spacing: f64,
    ) -> Result<Self, Error> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(Error::InvalidPath(format!(
                "the sample spacing must be positive, got {}",
                spacing
            )));
        }

        if let Some(index) = waypoints.iter().position(|w| !w.is_finite()) {
            return Err(Error::InvalidPath(format!("waypoint {} is not finite", index)));
        }

        let mut points = Vec::new();
        let mut distance = 0.0;
        for (i, segment) in segments.iter().enumerate() {
            let estimated_length = segment.estimated_length();
            if estimated_length < MIN_SEGMENT_LENGTH {
                return Err(Error::InvalidPath(format!(
                    "waypoints {} and {} are at the same position",
                    i,
                    i + 1
                )));
            }

            // Keep rounding noise in the length estimate from adding a sample. Every segment has
            // an interior sample so a rest to rest move has somewhere to reach a nonzero speed.
            let steps = (estimated_length / spacing - 1e-6).ceil().max(2.0) as usize;
            let parameters: Vec<f64> = (0..=steps).map(|k| k as f64 / steps as f64).collect();
            let positions: Vec<Vector2<f64>> =
                parameters.iter().map(|t| segment.position(*t)).collect();

            let mut cumulative = Vec::with_capacity(positions.len());
            let mut segment_length = 0.0;
            let mut previous_position = segment.p0;
            for position in &positions {
                segment_length += (position - previous_position).norm();
                cumulative.push(segment_length);
                previous_position = *position;
            }

            let start_heading = waypoints[i].heading();
            let heading_change =
                shortest_angular_distance(start_heading, waypoints[i + 1].heading());
            let heading_rate = heading_change / segment_length;

            // The first sample of a segment is the last sample of the one before it
            let first_step = if i == 0 { 0 } else { 1 };
            for step in first_step..=steps {
                let t = parameters[step];
                let position = positions[step];
                let heading = if step == steps {
                    waypoints[i + 1].heading()
                } else {
                    start_heading + heading_change * cumulative[step] / segment_length
                };

                let d1 = segment.first_derivative(t);
                let d2 = segment.second_derivative(t);
                let speed = d1.norm();
                let (course, curvature) = if speed > MIN_SEGMENT_LENGTH {
                    (
                        d1.y.atan2(d1.x),
                        (d1.x * d2.y - d1.y * d2.x) / (speed * speed * speed),
                    )
                } else {
                    let chord = segment.p1 - segment.p0;
                    (chord.y.atan2(chord.x), 0.0)
                };

                points.push(PathPoint::new(
                    Pose2d::new(position.x, position.y, heading),
                    course,
                    curvature,
                    heading_rate,
                    distance + cumulative[step],
                ));
            }

            distance += segment_length;
        }

        Ok(Self { points })
    }
}
