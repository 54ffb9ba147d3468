use super::*;
use float_cmp::approx_eq;
use nalgebra::Vector2;

fn limiter() -> CapsizeAccelerationLimiter {
    let limits = KinodynamicLimits::new(
        4.0,
        4.0,
        6.0,
        12.0,
        10.0,
        5.0,
        vec![Vector2::new(0.3, 0.3), Vector2::new(-0.3, -0.3)],
    )
    .unwrap();

    CapsizeAccelerationLimiter::new(&limits)
}

#[test]
fn when_the_velocity_change_is_large_it_should_limit_s() {
    let s = limiter().enforce_centripetal_limit(3.0, 4.0, 1.0, 0.02);

    assert!(approx_eq!(f64, s, 0.02, epsilon = 1e-12));
}

#[test]
fn when_the_velocity_change_is_small_it_should_keep_s() {
    let s = limiter().enforce_centripetal_limit(0.03, 0.04, 0.5, 0.02);

    assert_eq!(s, 0.5);
}

#[test]
fn when_the_velocity_does_not_change_it_should_keep_s() {
    assert_eq!(limiter().enforce_centripetal_limit(0.0, 0.0, 0.7, 0.02), 0.7);
}
