//! Time indexed motion profiles made out of constant jerk segments.
//!
//! Within a segment the state is advanced with the closed-form kinematic equations so sampling a
//! profile at any time gives the same answer no matter how it was sampled before. Trapezoidal
//! profiles are made of constant acceleration segments (zero jerk), jerk limited profiles are the
//! classic seven segment S-curve.

use log::{debug, warn};

use crate::motion_state::MotionState1D;

use super::ProfileConstraints;

#[cfg(test)]
#[path = "motion_profile_tests.rs"]
mod motion_profile_tests;

/// Differences smaller than this are treated as zero when planning.
const EPSILON: f64 = 1e-9;

/// The number of bisection steps used to find the time at which a jerk segment passes a
/// position.
const MAX_BISECTION_ITERATIONS: usize = 60;

/// A part of a motion profile with a constant jerk.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ProfileSegment {
    /// The state at the start of the segment.
    start: MotionState1D,

    /// The jerk during the segment.
    jerk: f64,

    /// The length of the segment in seconds.
    duration: f64,
}

impl ProfileSegment {
    /// Returns the state at the end of the segment.
    fn end(&self) -> MotionState1D {
        self.state_at(self.duration)
    }

    /// Returns the state `t` seconds after the start of the segment.
    fn state_at(&self, t: f64) -> MotionState1D {
        let p = self.start.position();
        let v = self.start.velocity();
        let a = self.start.acceleration();
        let j = self.jerk;

        MotionState1D::with_acceleration(
            p + v * t + 0.5 * a * t * t + j * t * t * t / 6.0,
            v + a * t + 0.5 * j * t * t,
            a + j * t,
        )
    }

    /// Returns the earliest time within the segment at which the segment reaches `position`.
    fn time_to_position(&self, position: f64) -> Option<f64> {
        let offset = self.start.position() - position;
        if self.jerk == 0.0 {
            return smaller_non_negative_root(
                0.5 * self.start.acceleration(),
                self.start.velocity(),
                offset,
            )
            .filter(|t| *t <= self.duration + EPSILON);
        }

        let error_at = |t: f64| self.state_at(t).position() - position;
        let mut low = 0.0;
        let mut high = self.duration;
        let low_error = error_at(low);
        if low_error.abs() <= EPSILON {
            return Some(0.0);
        }

        if low_error.signum() == error_at(high).signum() {
            return None;
        }

        for _ in 0..MAX_BISECTION_ITERATIONS {
            let middle = 0.5 * (low + high);
            if error_at(middle).signum() == low_error.signum() {
                low = middle;
            } else {
                high = middle;
            }
        }

        Some(high)
    }
}

/// Builds a profile one segment at a time, each segment starting where the previous one ended.
struct SegmentBuilder {
    segments: Vec<ProfileSegment>,
    current: MotionState1D,
}

impl SegmentBuilder {
    fn new(start: MotionState1D) -> Self {
        Self {
            segments: Vec::new(),
            current: start,
        }
    }

    /// Appends a segment that starts with the given acceleration and changes it at the given
    /// jerk. Segments without a duration are skipped.
    fn push(&mut self, acceleration: f64, jerk: f64, duration: f64) {
        if duration <= 0.0 {
            return;
        }

        let segment = ProfileSegment {
            start: MotionState1D::with_acceleration(
                self.current.position(),
                self.current.velocity(),
                acceleration,
            ),
            jerk,
            duration,
        };
        self.current = segment.end();
        self.segments.push(segment);
    }

    fn finish(self, goal: MotionState1D) -> MotionProfile {
        let duration = self.segments.iter().map(|s| s.duration).sum();
        MotionProfile {
            segments: self.segments,
            goal,
            duration,
        }
    }
}

/// A time indexed, immutable, motion profile between a start and a goal state.
///
/// Sampling the profile has no side effects, so a profile can be sampled at any time, in any
/// order, as often as required.
#[derive(Clone, Debug, PartialEq)]
pub struct MotionProfile {
    segments: Vec<ProfileSegment>,
    goal: MotionState1D,
    duration: f64,
}

impl MotionProfile {
    /// Returns the time, in seconds, it takes to reach the goal.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Creates the profile best suited for the given constraints.
    ///
    /// If the constraints have a jerk limit and the move starts and ends at rest a jerk limited
    /// profile is created, otherwise a trapezoidal profile is created.
    pub fn generate(
        start: &MotionState1D,
        goal: &MotionState1D,
        constraints: &ProfileConstraints,
    ) -> Self {
        match constraints.max_jerk() {
            Some(_) => Self::jerk_limited(start, goal, constraints),
            None => Self::trapezoidal(start, goal, constraints),
        }
    }

    /// Returns the state of the profile at time `t`.
    ///
    /// Times before the start of the profile return the start state, times at or after the end
    /// of the profile return the goal state. At the boundary between two segments the later
    /// segment is used, so the deceleration branch wins at the switching point.
    pub fn get(&self, t: f64) -> MotionState1D {
        if !t.is_finite() || t >= self.duration || self.segments.is_empty() {
            return self.goal;
        }

        if t <= 0.0 {
            return self.segments[0].start;
        }

        let mut segment_start_time = 0.0;
        for segment in &self.segments {
            let segment_end_time = segment_start_time + segment.duration;
            if t < segment_end_time {
                return segment.state_at(t - segment_start_time);
            }

            segment_start_time = segment_end_time;
        }

        self.goal
    }

    /// Returns the goal state of the profile.
    pub fn goal(&self) -> &MotionState1D {
        &self.goal
    }

    /// Creates a profile that holds the given position.
    pub fn hold(position: f64) -> Self {
        Self {
            segments: Vec::new(),
            goal: MotionState1D::at_rest(position),
            duration: 0.0,
        }
    }

    /// Creates a jerk limited (S-curve) profile.
    ///
    /// Jerk limiting is only done for moves that start and end at rest. Other moves fall back to
    /// a trapezoidal profile. If the constraints do not contain a jerk limit a trapezoidal profile
    /// is created as well.
    pub fn jerk_limited(
        start: &MotionState1D,
        goal: &MotionState1D,
        constraints: &ProfileConstraints,
    ) -> Self {
        let max_jerk = match constraints.max_jerk() {
            Some(j) => j,
            None => return Self::trapezoidal(start, goal, constraints),
        };

        if let Some(profile) = Self::reject_invalid_inputs(start, goal, constraints) {
            return profile;
        }

        let starts_at_rest = start.velocity().abs() <= EPSILON && start.acceleration().abs() <= EPSILON;
        let ends_at_rest = goal.velocity().abs() <= EPSILON;
        if !(starts_at_rest && ends_at_rest) {
            debug!(
                "Jerk limited profile requested for a move that is not rest-to-rest. Using a trapezoidal profile instead."
            );
            return Self::trapezoidal(start, goal, &constraints.without_jerk());
        }

        let goal_at_rest = MotionState1D::at_rest(goal.position());
        let distance = goal.position() - start.position();
        if distance.abs() <= EPSILON {
            return Self::hold(goal.position());
        }

        let direction = distance.signum();
        let distance = distance.abs();
        let max_velocity = constraints.max_velocity();
        let max_acceleration = constraints.max_acceleration();

        // The velocity reached when the acceleration ramps to the limit and straight back down.
        let full_ramp_velocity = max_acceleration * max_acceleration / max_jerk;
        let ramp_time = |peak: f64| {
            if peak >= full_ramp_velocity {
                peak / max_acceleration + max_acceleration / max_jerk
            } else {
                2.0 * (peak / max_jerk).sqrt()
            }
        };

        let mut peak_velocity = max_velocity;
        let mut cruise_time = 0.0;
        let cruise_distance = distance - peak_velocity * ramp_time(peak_velocity);
        if cruise_distance >= 0.0 {
            cruise_time = cruise_distance / peak_velocity;
        } else {
            // Without a cruise phase the distance covered is peak * ramp_time(peak). Try the case
            // where the acceleration limit is reached first, that is a quadratic in the peak.
            peak_velocity = smaller_non_negative_root(
                1.0 / max_acceleration,
                max_acceleration / max_jerk,
                -distance,
            )
            .unwrap_or(0.0);

            if peak_velocity < full_ramp_velocity {
                peak_velocity = (distance * distance * max_jerk / 4.0).cbrt();
            }
        }

        let (jerk_time, constant_time, peak_acceleration) = if peak_velocity >= full_ramp_velocity {
            (
                max_acceleration / max_jerk,
                (peak_velocity / max_acceleration - max_acceleration / max_jerk).max(0.0),
                max_acceleration,
            )
        } else {
            let t = (peak_velocity / max_jerk).sqrt();
            (t, 0.0, max_jerk * t)
        };

        let j = direction * max_jerk;
        let a = direction * peak_acceleration;

        let mut builder = SegmentBuilder::new(MotionState1D::at_rest(start.position()));
        builder.push(0.0, j, jerk_time);
        builder.push(a, 0.0, constant_time);
        builder.push(a, -j, jerk_time);
        builder.push(0.0, 0.0, cruise_time);
        builder.push(0.0, -j, jerk_time);
        builder.push(-a, 0.0, constant_time);
        builder.push(-a, j, jerk_time);
        builder.finish(goal_at_rest)
    }

    /// Returns the earliest time at which the profile reaches the given position, or [None] if
    /// the profile never passes through the position.
    pub fn time_at_position(&self, position: f64) -> Option<f64> {
        let mut segment_start_time = 0.0;
        for segment in &self.segments {
            if let Some(t) = segment.time_to_position(position) {
                return Some(segment_start_time + t);
            }

            segment_start_time += segment.duration;
        }

        if (self.goal.position() - position).abs() <= EPSILON {
            Some(self.duration)
        } else {
            None
        }
    }

    /// Creates a trapezoidal profile: accelerate at the maximum acceleration, cruise at the
    /// maximum velocity, decelerate at the maximum acceleration.
    ///
    /// The profile handles goals behind the start position, start states that are moving away
    /// from the goal and goal states with a non-zero velocity. Start and goal velocities that
    /// exceed the velocity limit are clamped to the limit.
    pub fn trapezoidal(
        start: &MotionState1D,
        goal: &MotionState1D,
        constraints: &ProfileConstraints,
    ) -> Self {
        if let Some(profile) = Self::reject_invalid_inputs(start, goal, constraints) {
            return profile;
        }

        let max_velocity = constraints.max_velocity();
        let max_acceleration = constraints.max_acceleration();

        let start_velocity = start.velocity().clamp(-max_velocity, max_velocity);
        let goal_velocity = goal.velocity().clamp(-max_velocity, max_velocity);
        let goal = MotionState1D::new(goal.position(), goal_velocity);

        let distance = goal.position() - start.position();
        if distance.abs() <= EPSILON && (goal_velocity - start_velocity).abs() <= EPSILON {
            return Self {
                segments: Vec::new(),
                goal,
                duration: 0.0,
            };
        }

        // The distance covered when changing straight from the start velocity to the goal
        // velocity. If more distance has to be covered the profile first accelerates in the
        // positive direction, otherwise it first accelerates in the negative direction.
        let direct_distance =
            (goal_velocity - start_velocity).abs() * (start_velocity + goal_velocity)
                / (2.0 * max_acceleration);
        let direction = if distance >= direct_distance { 1.0 } else { -1.0 };

        // Work in the frame where the first acceleration is positive.
        let d = direction * distance;
        let u0 = direction * start_velocity;
        let u1 = direction * goal_velocity;

        let mut peak = ((2.0 * max_acceleration * d + u0 * u0 + u1 * u1) / 2.0)
            .max(0.0)
            .sqrt();
        let mut cruise_time = 0.0;
        if peak > max_velocity {
            peak = max_velocity;
            let ramp_distance =
                (2.0 * max_velocity * max_velocity - u0 * u0 - u1 * u1) / (2.0 * max_acceleration);
            cruise_time = ((d - ramp_distance) / max_velocity).max(0.0);
        }

        let accelerate_time = ((peak - u0) / max_acceleration).max(0.0);
        let decelerate_time = ((peak - u1) / max_acceleration).max(0.0);

        let a = direction * max_acceleration;
        let mut builder = SegmentBuilder::new(MotionState1D::new(start.position(), start_velocity));
        builder.push(a, 0.0, accelerate_time);
        builder.push(0.0, 0.0, cruise_time);
        builder.push(-a, 0.0, decelerate_time);
        builder.finish(goal)
    }

    /// Returns a holding profile if the inputs cannot be used to plan a profile.
    fn reject_invalid_inputs(
        start: &MotionState1D,
        goal: &MotionState1D,
        constraints: &ProfileConstraints,
    ) -> Option<Self> {
        if start.is_finite() && goal.is_finite() && constraints.is_valid() {
            return None;
        }

        warn!(
            "Cannot plan a motion profile from {:?} to {:?} with {:?}. Holding position.",
            start, goal, constraints
        );

        let position = if start.position().is_finite() {
            start.position()
        } else {
            0.0
        };
        Some(Self::hold(position))
    }
}

/// Returns the smaller non-negative root of `a * t^2 + b * t + c = 0`, or [None] if the
/// equation has no non-negative root.
///
/// Roots that are negative by less than the planning tolerance are returned as zero.
pub(crate) fn smaller_non_negative_root(a: f64, b: f64, c: f64) -> Option<f64> {
    if a.abs() <= EPSILON {
        if b.abs() <= EPSILON {
            return None;
        }

        let t = -c / b;
        return non_negative(t);
    }

    let mut discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        if discriminant < -EPSILON {
            return None;
        }

        discriminant = 0.0;
    }

    // Numerically stable form of the quadratic formula
    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    let (r1, r2) = if q == 0.0 {
        (0.0, 0.0)
    } else {
        (q / a, c / q)
    };

    let (low, high) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
    non_negative(low).or_else(|| non_negative(high))
}

fn non_negative(t: f64) -> Option<f64> {
    if t >= 0.0 {
        Some(t)
    } else if t > -EPSILON {
        Some(0.0)
    } else {
        None
    }
}
