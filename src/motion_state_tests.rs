use super::*;
use float_cmp::approx_eq;
use std::f64::consts::PI;

#[test]
fn test_new_motion_state() {
    let state = MotionState1D::new(10.0, 5.0);

    assert_eq!(state.position(), 10.0);
    assert_eq!(state.velocity(), 5.0);
    assert_eq!(state.acceleration(), 0.0);
    assert!(state.is_finite());
}

#[test]
fn test_motion_state_with_acceleration() {
    let state = MotionState1D::with_acceleration(1.0, 2.0, 3.0);

    assert_eq!(state.acceleration(), 3.0);
    assert!(!MotionState1D::with_acceleration(1.0, f64::NAN, 3.0).is_finite());
}

#[test]
fn test_motion_state_is_near() {
    let a = MotionState1D::new(1.0, 0.5);
    let b = MotionState1D::new(1.05, 0.45);

    assert!(a.is_near(&b, 0.1, 0.1));
    assert!(!a.is_near(&b, 0.01, 0.1));
    assert!(!a.is_near(&b, 0.1, 0.01));
}

#[test]
fn when_creating_a_pose_it_should_normalize_the_heading() {
    let pose = Pose2d::new(1.0, 2.0, -PI);

    assert_eq!(pose.x(), 1.0);
    assert_eq!(pose.y(), 2.0);
    assert_eq!(pose.heading(), PI);

    let pose = Pose2d::new(0.0, 0.0, 2.5 * PI);
    assert!(approx_eq!(f64, pose.heading(), 0.5 * PI, epsilon = 1e-12));
}

#[test]
fn when_building_a_swerve_state_from_a_pose_it_should_copy_positions_and_velocities() {
    let pose = Pose2d::new(1.0, 1.0, 1.0);
    let velocity = FieldRelativeVelocity::new(1.0, 1.0, 1.0);

    let state = SwerveState::from_pose_and_velocity(&pose, &velocity);

    assert!(approx_eq!(f64, state.x().position(), 1.0, epsilon = 0.001));
    assert!(approx_eq!(f64, state.y().velocity(), 1.0, epsilon = 0.001));
    assert!(approx_eq!(f64, state.theta().position(), 1.0, epsilon = 0.001));
    assert_eq!(state.pose(), pose);
    assert_eq!(state.velocity(), velocity);
}

#[test]
fn when_converting_field_relative_velocity_to_the_body_frame_it_should_rotate_by_the_heading() {
    let velocity = FieldRelativeVelocity::new(1.0, 0.0, 0.5);

    let body = ChassisSpeeds::from_field_relative(&velocity, 0.5 * PI);

    assert!(approx_eq!(f64, body.vx(), 0.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, body.vy(), -1.0, epsilon = 1e-12));
    assert_eq!(body.omega(), 0.5);

    let back = body.to_field_relative(0.5 * PI);
    assert!(approx_eq!(f64, back.vx(), 1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, back.vy(), 0.0, epsilon = 1e-12));
}

#[test]
fn when_interpolating_chassis_speeds_it_should_scale_the_difference() {
    let start = ChassisSpeeds::new(1.0, 0.0, -1.0);
    let end = ChassisSpeeds::new(3.0, 2.0, 1.0);

    let half = start.interpolate(&end, 0.5);

    assert_eq!(half, ChassisSpeeds::new(2.0, 1.0, 0.0));
    assert_eq!(start.interpolate(&end, 0.0), start);
    assert_eq!(start.interpolate(&end, 1.0), end);
}

#[test]
fn test_chassis_speeds_is_zero() {
    assert!(ChassisSpeeds::zero().is_zero(1e-9));
    assert!(!ChassisSpeeds::new(0.0, 1e-3, 0.0).is_zero(1e-9));
    assert!(ChassisSpeeds::new(0.0, 1e-12, 0.0).is_zero(1e-9));
}

#[test]
fn when_moving_the_heading_near_a_reference_it_should_keep_the_equivalent_angle() {
    let state = SwerveState::new(
        MotionState1D::new(0.0, 0.0),
        MotionState1D::new(0.0, 0.0),
        MotionState1D::new(-0.9 * PI, 0.3),
    );

    let moved = state.with_heading_near(0.9 * PI);

    assert!(approx_eq!(f64, moved.theta().position(), 1.1 * PI, epsilon = 1e-12));
    assert_eq!(moved.theta().velocity(), 0.3);
}

#[test]
fn test_current_state_to_swerve_state() {
    let current = CurrentState::new(
        Pose2d::new(2.0, -1.0, 0.25),
        FieldRelativeVelocity::new(0.5, 0.1, -0.2),
    );

    let state = current.to_swerve_state();

    assert!(current.is_finite());
    assert_eq!(state.x().position(), 2.0);
    assert_eq!(state.y().velocity(), 0.1);
    assert_eq!(state.theta().velocity(), -0.2);
}
