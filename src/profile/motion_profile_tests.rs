use super::*;
use float_cmp::approx_eq;

fn assert_within_limits(profile: &MotionProfile, constraints: &ProfileConstraints) {
    let steps = 1000;
    for i in 0..=steps {
        let t = profile.duration() * (i as f64) / (steps as f64);
        let state = profile.get(t);

        assert!(state.is_finite());
        assert!(
            state.velocity().abs() <= constraints.max_velocity() + 1e-9,
            "velocity {} at t = {} exceeds the limit",
            state.velocity(),
            t
        );
        assert!(
            state.acceleration().abs() <= constraints.max_acceleration() + 1e-9,
            "acceleration {} at t = {} exceeds the limit",
            state.acceleration(),
            t
        );
    }
}

#[test]
fn when_moving_a_long_distance_it_should_cruise_at_the_maximum_velocity() {
    let constraints = ProfileConstraints::new(2.0, 2.0, None);
    let profile = MotionProfile::trapezoidal(
        &MotionState1D::at_rest(0.0),
        &MotionState1D::at_rest(4.0),
        &constraints,
    );

    assert!(approx_eq!(f64, profile.duration(), 3.0, epsilon = 1e-9));

    let end_of_acceleration = profile.get(1.0 - 1e-9);
    assert!(approx_eq!(f64, end_of_acceleration.position(), 1.0, epsilon = 1e-6));

    let middle = profile.get(1.5);
    assert!(approx_eq!(f64, middle.position(), 2.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, middle.velocity(), 2.0, epsilon = 1e-9));
    assert_eq!(middle.acceleration(), 0.0);

    let start_of_deceleration = profile.get(2.0);
    assert!(approx_eq!(f64, start_of_deceleration.position(), 3.0, epsilon = 1e-9));
    assert_eq!(start_of_deceleration.acceleration(), -2.0);

    assert_within_limits(&profile, &constraints);
}

#[test]
fn when_sampling_at_the_end_it_should_return_the_goal() {
    let constraints = ProfileConstraints::new(2.0, 2.0, None);
    let goal = MotionState1D::at_rest(4.0);
    let profile = MotionProfile::trapezoidal(&MotionState1D::at_rest(0.0), &goal, &constraints);

    assert_eq!(profile.get(profile.duration()), goal);
    assert_eq!(profile.get(profile.duration() + 10.0), goal);
    assert_eq!(profile.get(-1.0), MotionState1D::with_acceleration(0.0, 0.0, 2.0));
}

#[test]
fn when_moving_a_short_distance_it_should_create_a_triangular_profile() {
    let constraints = ProfileConstraints::new(2.0, 2.0, None);
    let profile = MotionProfile::trapezoidal(
        &MotionState1D::at_rest(0.0),
        &MotionState1D::at_rest(1.0),
        &constraints,
    );

    // Peak velocity sqrt(a * d) = sqrt(2), reached after sqrt(2) / 2 seconds
    let half_time = 2.0_f64.sqrt() / 2.0;
    assert!(approx_eq!(f64, profile.duration(), 2.0 * half_time, epsilon = 1e-9));

    let peak = profile.get(half_time);
    assert!(approx_eq!(f64, peak.velocity(), 2.0_f64.sqrt(), epsilon = 1e-9));
    assert!(approx_eq!(f64, peak.position(), 0.5, epsilon = 1e-9));

    assert_within_limits(&profile, &constraints);
}

#[test]
fn when_the_goal_is_behind_the_start_it_should_move_backwards() {
    let constraints = ProfileConstraints::new(2.0, 2.0, None);
    let profile = MotionProfile::trapezoidal(
        &MotionState1D::at_rest(4.0),
        &MotionState1D::at_rest(0.0),
        &constraints,
    );

    assert!(approx_eq!(f64, profile.duration(), 3.0, epsilon = 1e-9));

    let middle = profile.get(1.5);
    assert!(approx_eq!(f64, middle.position(), 2.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, middle.velocity(), -2.0, epsilon = 1e-9));

    assert_within_limits(&profile, &constraints);
}

#[test]
fn when_moving_away_from_the_goal_it_should_reverse() {
    let constraints = ProfileConstraints::new(2.0, 1.0, None);
    let goal = MotionState1D::at_rest(1.0);
    let profile = MotionProfile::trapezoidal(&MotionState1D::new(0.0, -1.0), &goal, &constraints);

    let early = profile.get(0.5);
    assert!(early.velocity() < 0.0);
    assert!(early.position() < 0.0);

    let end = profile.get(profile.duration());
    assert_eq!(end, goal);

    assert_within_limits(&profile, &constraints);
}

#[test]
fn when_the_start_velocity_exceeds_the_limit_it_should_clamp_it() {
    let constraints = ProfileConstraints::new(1.0, 1.0, None);
    let profile = MotionProfile::trapezoidal(
        &MotionState1D::new(0.0, 3.0),
        &MotionState1D::at_rest(10.0),
        &constraints,
    );

    let start = profile.get(0.0);
    assert_eq!(start.velocity(), 1.0);

    assert_within_limits(&profile, &constraints);
}

#[test]
fn when_the_start_is_at_the_goal_it_should_return_an_empty_profile() {
    let constraints = ProfileConstraints::new(1.0, 1.0, None);
    let profile = MotionProfile::trapezoidal(
        &MotionState1D::at_rest(2.0),
        &MotionState1D::at_rest(2.0),
        &constraints,
    );

    assert_eq!(profile.duration(), 0.0);
    assert_eq!(profile.get(0.0), MotionState1D::at_rest(2.0));
}

#[test]
fn when_the_goal_has_a_velocity_it_should_arrive_with_that_velocity() {
    let constraints = ProfileConstraints::new(2.0, 2.0, None);
    let goal = MotionState1D::new(3.0, 1.0);
    let profile = MotionProfile::trapezoidal(&MotionState1D::at_rest(0.0), &goal, &constraints);

    let almost_done = profile.get(profile.duration() - 1e-9);
    assert!(approx_eq!(f64, almost_done.position(), 3.0, epsilon = 1e-6));
    assert!(approx_eq!(f64, almost_done.velocity(), 1.0, epsilon = 1e-6));

    assert_within_limits(&profile, &constraints);
}

#[test]
fn when_the_inputs_are_not_finite_it_should_hold_position() {
    let constraints = ProfileConstraints::new(2.0, 2.0, None);

    let profile = MotionProfile::trapezoidal(
        &MotionState1D::at_rest(1.0),
        &MotionState1D::at_rest(f64::NAN),
        &constraints,
    );
    assert_eq!(profile.duration(), 0.0);
    assert_eq!(profile.get(0.5), MotionState1D::at_rest(1.0));

    let profile = MotionProfile::trapezoidal(
        &MotionState1D::at_rest(f64::INFINITY),
        &MotionState1D::at_rest(1.0),
        &constraints,
    );
    assert_eq!(profile.get(0.5), MotionState1D::at_rest(0.0));

    let invalid = ProfileConstraints::new(-1.0, 2.0, None);
    let profile = MotionProfile::trapezoidal(
        &MotionState1D::at_rest(1.0),
        &MotionState1D::at_rest(2.0),
        &invalid,
    );
    assert_eq!(profile.get(0.5), MotionState1D::at_rest(1.0));
}

#[test]
fn when_jerk_limited_it_should_respect_all_limits() {
    let constraints = ProfileConstraints::new(2.0, 2.0, Some(8.0));
    let goal = MotionState1D::at_rest(4.0);
    let profile = MotionProfile::jerk_limited(&MotionState1D::at_rest(0.0), &goal, &constraints);

    // Ramps of 0.25 seconds stretch each of the velocity changes by that amount.
    assert!(approx_eq!(f64, profile.duration(), 3.25, epsilon = 1e-9));
    assert_within_limits(&profile, &constraints);

    let steps = 1000;
    let dt = profile.duration() / (steps as f64);
    let mut previous = profile.get(0.0);
    for i in 1..=steps {
        let state = profile.get(dt * (i as f64));
        let jerk = (state.acceleration() - previous.acceleration()) / dt;
        assert!(jerk.abs() <= 8.0 + 1e-6, "jerk {} exceeds the limit", jerk);
        previous = state;
    }

    let end = profile.get(profile.duration() - 1e-9);
    assert!(approx_eq!(f64, end.position(), 4.0, epsilon = 1e-6));
    assert_eq!(profile.get(profile.duration()), goal);
}

#[test]
fn when_jerk_limited_over_a_short_distance_it_should_not_reach_the_acceleration_limit() {
    let constraints = ProfileConstraints::new(2.0, 2.0, Some(1.0));
    let profile = MotionProfile::jerk_limited(
        &MotionState1D::at_rest(0.0),
        &MotionState1D::at_rest(0.5),
        &constraints,
    );

    assert_within_limits(&profile, &constraints);

    let middle = profile.get(profile.duration() / 2.0);
    assert!(approx_eq!(f64, middle.position(), 0.25, epsilon = 1e-9));
    assert!(middle.velocity() > 0.0);

    let almost_done = profile.get(profile.duration() - 1e-9);
    assert!(approx_eq!(f64, almost_done.position(), 0.5, epsilon = 1e-6));
}

#[test]
fn when_jerk_limited_and_not_at_rest_it_should_fall_back_to_a_trapezoid() {
    let constraints = ProfileConstraints::new(2.0, 2.0, Some(8.0));
    let start = MotionState1D::new(0.0, 1.0);
    let goal = MotionState1D::at_rest(4.0);

    let jerk_limited = MotionProfile::jerk_limited(&start, &goal, &constraints);
    let trapezoidal = MotionProfile::trapezoidal(&start, &goal, &constraints.without_jerk());

    assert_eq!(jerk_limited, trapezoidal);
}

#[test]
fn when_generating_it_should_pick_the_profile_from_the_constraints() {
    let start = MotionState1D::at_rest(0.0);
    let goal = MotionState1D::at_rest(4.0);

    let trapezoid = MotionProfile::generate(&start, &goal, &ProfileConstraints::new(2.0, 2.0, None));
    assert!(approx_eq!(f64, trapezoid.duration(), 3.0, epsilon = 1e-9));

    let s_curve = MotionProfile::generate(&start, &goal, &ProfileConstraints::new(2.0, 2.0, Some(8.0)));
    assert!(approx_eq!(f64, s_curve.duration(), 3.25, epsilon = 1e-9));
}

#[test]
fn when_finding_the_time_at_a_position_it_should_search_all_segments() {
    let constraints = ProfileConstraints::new(2.0, 2.0, None);
    let profile = MotionProfile::trapezoidal(
        &MotionState1D::at_rest(0.0),
        &MotionState1D::at_rest(4.0),
        &constraints,
    );

    let t = profile.time_at_position(2.0).unwrap();
    assert!(approx_eq!(f64, t, 1.5, epsilon = 1e-9));

    let t = profile.time_at_position(0.25).unwrap();
    assert!(approx_eq!(f64, t, 0.5, epsilon = 1e-9));

    let t = profile.time_at_position(4.0).unwrap();
    assert!(approx_eq!(f64, t, 3.0, epsilon = 1e-6));

    assert!(profile.time_at_position(5.0).is_none());
}

#[test]
fn when_finding_the_time_in_a_jerk_segment_it_should_match_the_sampled_state() {
    let constraints = ProfileConstraints::new(2.0, 2.0, Some(8.0));
    let profile = MotionProfile::jerk_limited(
        &MotionState1D::at_rest(0.0),
        &MotionState1D::at_rest(4.0),
        &constraints,
    );

    let position = profile.get(0.1).position();
    let t = profile.time_at_position(position).unwrap();
    assert!(approx_eq!(f64, t, 0.1, epsilon = 1e-6));
}

#[test]
fn test_smaller_non_negative_root() {
    // (t - 1)(t - 3)
    let root = smaller_non_negative_root(1.0, -4.0, 3.0).unwrap();
    assert!(approx_eq!(f64, root, 1.0, epsilon = 1e-12));

    // (t + 1)(t - 2)
    let root = smaller_non_negative_root(1.0, -1.0, -2.0).unwrap();
    assert!(approx_eq!(f64, root, 2.0, epsilon = 1e-12));

    // Linear
    let root = smaller_non_negative_root(0.0, 2.0, -4.0).unwrap();
    assert!(approx_eq!(f64, root, 2.0, epsilon = 1e-12));

    // No real roots
    assert!(smaller_non_negative_root(1.0, 0.0, 1.0).is_none());

    // Only negative roots
    assert!(smaller_non_negative_root(1.0, 3.0, 2.0).is_none());
}
