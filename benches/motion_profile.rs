use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swerve_drive_control::{
    motion_state::MotionState1D,
    profile::{motion_profile::MotionProfile, trapezoid_profile::TrapezoidProfile, ProfileConstraints},
};

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets =
        trapezoidal_profile_generate,
        jerk_limited_profile_generate,
        motion_profile_get,
        trapezoid_profile_calculate,
}

criterion_main!(benches);

pub fn trapezoidal_profile_generate(c: &mut Criterion) {
    let constraints = ProfileConstraints::new(4.0, 3.0, None);
    let start = MotionState1D::new(0.0, 0.5);
    let goal = MotionState1D::at_rest(5.0);

    c.bench_function("MotionProfile::trapezoidal", |b| {
        b.iter(|| MotionProfile::trapezoidal(black_box(&start), black_box(&goal), &constraints))
    });
}

pub fn jerk_limited_profile_generate(c: &mut Criterion) {
    let constraints = ProfileConstraints::new(4.0, 3.0, Some(10.0));
    let start = MotionState1D::at_rest(0.0);
    let goal = MotionState1D::at_rest(5.0);

    c.bench_function("MotionProfile::jerk_limited", |b| {
        b.iter(|| MotionProfile::jerk_limited(black_box(&start), black_box(&goal), &constraints))
    });
}

pub fn motion_profile_get(c: &mut Criterion) {
    let constraints = ProfileConstraints::new(4.0, 3.0, Some(10.0));
    let profile = MotionProfile::jerk_limited(
        &MotionState1D::at_rest(0.0),
        &MotionState1D::at_rest(5.0),
        &constraints,
    );
    let t = 0.5 * profile.duration();

    c.bench_function("MotionProfile::get", |b| b.iter(|| profile.get(black_box(t))));
}

pub fn trapezoid_profile_calculate(c: &mut Criterion) {
    let profile = TrapezoidProfile::new(ProfileConstraints::new(4.0, 3.0, None), 0.01);
    let current = MotionState1D::new(1.0, 2.0);
    let goal = MotionState1D::at_rest(5.0);

    c.bench_function("TrapezoidProfile::calculate", |b| {
        b.iter(|| profile.calculate(black_box(0.02), black_box(&current), black_box(&goal)))
    });
}
