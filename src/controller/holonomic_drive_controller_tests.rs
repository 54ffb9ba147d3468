use super::*;
use float_cmp::approx_eq;
use nalgebra::Vector2;
use std::f64::consts::{FRAC_PI_2, PI};

fn params() -> ControllerParams {
    ControllerParams {
        translation: PidGains::proportional(2.0),
        rotation: PidGains::proportional(1.0),
        tolerance: ReferenceTolerance {
            position: 0.01,
            velocity: 0.02,
            heading: 0.01,
            angular_velocity: 0.02,
        },
    }
}

fn state(x: (f64, f64), y: (f64, f64), theta: (f64, f64)) -> SwerveState {
    SwerveState::new(
        MotionState1D::new(x.0, x.1),
        MotionState1D::new(y.0, y.1),
        MotionState1D::new(theta.0, theta.1),
    )
}

fn limits() -> KinodynamicLimits {
    KinodynamicLimits::new(
        1.0,
        2.0,
        1.5,
        3.0,
        10.0,
        5.0,
        vec![Vector2::new(0.3, 0.3), Vector2::new(-0.3, -0.3)],
    )
    .unwrap()
}

#[test]
fn when_on_the_reference_it_should_only_feed_forward() {
    let mut controller = HolonomicDriveController::new(&params(), 0.02);
    let reference = state((1.0, 0.5), (2.0, -0.25), (0.0, 0.1));

    let output = controller.calculate(&reference, &reference);

    assert_eq!(output, ChassisSpeeds::new(0.5, -0.25, 0.1));
    assert!(controller.at_reference());
}

#[test]
fn when_behind_the_reference_it_should_add_feedback() {
    let mut controller = HolonomicDriveController::new(&params(), 0.02);
    let measured = state((0.0, 0.0), (0.0, 0.0), (0.0, 0.0));
    let reference = state((0.1, 0.5), (-0.1, 0.0), (0.2, 0.0));

    let output = controller.calculate_field_relative(&measured, &reference);

    assert!(approx_eq!(f64, output.vx(), 0.7, epsilon = 1e-12));
    assert!(approx_eq!(f64, output.vy(), -0.2, epsilon = 1e-12));
    assert!(approx_eq!(f64, output.omega(), 0.2, epsilon = 1e-12));
    assert!(!controller.at_reference());
}

#[test]
fn when_converting_to_the_body_frame_it_should_use_the_measured_heading() {
    let mut controller = HolonomicDriveController::new(&params(), 0.02);
    let measured = state((0.0, 1.0), (0.0, 0.0), (FRAC_PI_2, 0.0));
    let reference = state((0.0, 1.0), (0.0, 0.0), (FRAC_PI_2, 0.0));

    let output = controller.calculate(&measured, &reference);

    assert!(approx_eq!(f64, output.vx(), 0.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, output.vy(), -1.0, epsilon = 1e-12));
}

#[test]
fn when_the_heading_error_crosses_the_boundary_it_should_take_the_short_way() {
    let mut controller = HolonomicDriveController::new(&params(), 0.02);
    let measured = state((0.0, 0.0), (0.0, 0.0), (0.9 * PI, 0.0));
    let reference = state((0.0, 0.0), (0.0, 0.0), (-0.9 * PI, 0.0));

    let output = controller.calculate_field_relative(&measured, &reference);

    assert!(approx_eq!(f64, output.omega(), 0.2 * PI, epsilon = 1e-9));
}

#[test]
fn when_any_single_axis_is_out_of_tolerance_it_should_not_be_at_reference() {
    let reference = state((1.0, 0.0), (1.0, 0.0), (1.0, 0.0));
    let offsets = [
        state((1.02, 0.0), (1.0, 0.0), (1.0, 0.0)),
        state((1.0, 0.03), (1.0, 0.0), (1.0, 0.0)),
        state((1.0, 0.0), (0.98, 0.0), (1.0, 0.0)),
        state((1.0, 0.0), (1.0, -0.03), (1.0, 0.0)),
        state((1.0, 0.0), (1.0, 0.0), (1.02, 0.0)),
        state((1.0, 0.0), (1.0, 0.0), (1.0, 0.03)),
    ];

    for measured in offsets {
        let mut controller = HolonomicDriveController::new(&params(), 0.02);
        controller.calculate(&measured, &reference);
        assert!(!controller.at_reference(), "{:?} should be out of tolerance", measured);
    }

    let mut controller = HolonomicDriveController::new(&params(), 0.02);
    controller.calculate(&state((1.005, 0.01), (0.995, -0.01), (1.005, 0.01)), &reference);
    assert!(controller.at_reference());
}

#[test]
fn when_not_calculated_yet_it_should_not_be_at_reference() {
    let mut controller = HolonomicDriveController::new(&params(), 0.02);
    assert!(!controller.at_reference());

    let reference = state((0.0, 0.0), (0.0, 0.0), (0.0, 0.0));
    controller.calculate(&reference, &reference);
    assert!(controller.at_reference());

    controller.reset();
    assert!(!controller.at_reference());
    assert!(controller.errors().is_none());
}

#[test]
fn when_limited_it_should_clamp_the_output() {
    let mut controller = HolonomicDriveController::new(&params(), 0.02).with_limits(&limits());
    let measured = state((0.0, 0.0), (0.0, 0.0), (0.0, 0.0));
    let reference = state((3.0, 0.0), (4.0, 0.0), (2.0, 0.0));

    let output = controller.calculate_field_relative(&measured, &reference);

    assert!(approx_eq!(f64, output.speed(), 1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, output.vx(), 0.6, epsilon = 1e-12));
    assert!(approx_eq!(f64, output.vy(), 0.8, epsilon = 1e-12));
    assert_eq!(output.omega(), 1.5);
}

#[test]
fn when_a_state_is_not_finite_it_should_command_zero() {
    let mut controller = HolonomicDriveController::new(&params(), 0.02);
    let measured = state((f64::NAN, 0.0), (0.0, 0.0), (0.0, 0.0));
    let reference = state((1.0, 1.0), (0.0, 0.0), (0.0, 0.0));

    let output = controller.calculate(&measured, &reference);

    assert_eq!(output, ChassisSpeeds::zero());
    assert!(!controller.at_reference());
}

#[test]
fn when_the_tolerance_changes_it_should_use_the_new_tolerance() {
    let mut controller = HolonomicDriveController::new(&params(), 0.02);
    let reference = state((1.0, 0.0), (0.0, 0.0), (0.0, 0.0));
    controller.calculate(&state((0.9, 0.0), (0.0, 0.0), (0.0, 0.0)), &reference);
    assert!(!controller.at_reference());

    controller.set_tolerance(ReferenceTolerance {
        position: 0.2,
        velocity: 0.2,
        heading: 0.2,
        angular_velocity: 0.2,
    });

    assert!(controller.at_reference());
    assert_eq!(controller.tolerance().position, 0.2);
}
