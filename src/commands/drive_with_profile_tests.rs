use super::*;
use float_cmp::approx_eq;
use nalgebra::Vector2;

fn limits() -> KinodynamicLimits {
    KinodynamicLimits::new(
        4.0,
        2.0,
        6.0,
        12.0,
        10.0,
        5.0,
        vec![
            Vector2::new(0.3, 0.3),
            Vector2::new(0.3, -0.3),
            Vector2::new(-0.3, 0.3),
            Vector2::new(-0.3, -0.3),
        ],
    )
    .unwrap()
}

fn at_rest(x: f64, y: f64, heading: f64) -> SwerveState {
    SwerveState::new(
        MotionState1D::at_rest(x),
        MotionState1D::at_rest(y),
        MotionState1D::at_rest(heading),
    )
}

#[test]
fn when_tracking_perfectly_it_should_reach_the_goal_and_finish() {
    let mut command = DriveWithProfile::new(&limits(), Pose2d::new(1.0, 0.5, 1.0));
    let mut measured = at_rest(0.0, 0.0, 0.0);
    command.initialize(&measured).unwrap();

    let mut cycles = 0;
    while !command.is_finished(true) {
        measured = command.step(0.02, &measured);
        cycles += 1;
        assert!(cycles < 200);
        assert!(measured.x().velocity().abs() <= 4.0 + 1e-9);
        assert!(measured.theta().velocity().abs() <= 6.0 + 1e-9);
    }

    assert_eq!(measured.x().position(), 1.0);
    assert_eq!(measured.y().position(), 0.5);
    assert!(approx_eq!(f64, measured.theta().position(), 1.0, epsilon = 1e-12));
    assert_eq!(measured.x().velocity(), 0.0);
}

#[test]
fn when_the_controller_is_not_at_the_reference_it_should_not_finish() {
    let mut command = DriveWithProfile::new(&limits(), Pose2d::new(0.001, 0.0, 0.0));
    let measured = at_rest(0.0, 0.0, 0.0);
    command.initialize(&measured).unwrap();

    command.step(0.02, &measured);

    assert!(!command.is_finished(false));
    assert!(command.is_finished(true));
}

#[test]
fn when_the_goal_heading_is_across_the_boundary_it_should_take_the_short_way() {
    let mut command = DriveWithProfile::new(&limits(), Pose2d::new(0.0, 0.0, -3.0));
    let measured = at_rest(0.0, 0.0, 3.0);
    command.initialize(&measured).unwrap();

    let reference = command.step(0.02, &measured);

    assert!(reference.theta().velocity() > 0.0);
    assert!(reference.theta().position() > 3.0);
}

#[test]
fn when_stepped_before_initializing_it_should_hold() {
    let mut command = DriveWithProfile::new(&limits(), Pose2d::new(1.0, 0.0, 0.0));
    let measured = SwerveState::new(
        MotionState1D::new(0.5, 1.0),
        MotionState1D::new(0.2, 0.0),
        MotionState1D::new(0.1, 0.0),
    );

    let reference = command.step(0.02, &measured);

    assert_eq!(reference, at_rest(0.5, 0.2, 0.1));
    assert!(!command.is_finished(true));
}

#[test]
fn when_the_goal_is_not_finite_it_should_fail_to_initialize() {
    let mut command = DriveWithProfile::new(&limits(), Pose2d::new(f64::NAN, 0.0, 0.0));

    let result = command.initialize(&at_rest(0.0, 0.0, 0.0));

    assert!(matches!(result, Err(Error::NonFiniteValue(_))));
}

#[test]
fn when_the_measurement_is_not_finite_it_should_keep_the_profile_setpoint() {
    let mut command = DriveWithProfile::new(&limits(), Pose2d::new(1.0, 0.0, 2.0));
    let measured = at_rest(0.0, 0.0, 2.0);
    command.initialize(&measured).unwrap();
    let before = command.step(0.02, &measured);

    let invalid = at_rest(0.0, 0.0, f64::NAN);
    let held = command.step(0.02, &invalid);

    assert_eq!(held, before);

    let after = command.step(0.02, &measured);
    assert!(approx_eq!(f64, after.theta().position(), 2.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, after.theta().velocity(), 0.0, epsilon = 1e-9));
    assert!(after.x().position() > before.x().position());
}
