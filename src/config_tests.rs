use super::*;

const REFERENCE_CONFIG: &str = include_str!("../params/swerve_control.toml");

const MINIMAL_CONFIG: &str = r#"
period_s = 0.01

[limits]
max_drive_velocity = 3.0
max_drive_acceleration = 2.0
max_angular_velocity = 5.0
max_angular_acceleration = 10.0
max_steering_velocity = 8.0
max_capsize_acceleration = 4.0
module_offsets = [[0.25, 0.25], [-0.25, -0.25]]

[trajectory]
max_friction_acceleration = 5.0
"#;

fn invalid_name(result: Result<ControlConfig, Error>) -> String {
    match result {
        Err(Error::InvalidConfiguration { name, .. }) => name,
        other => panic!("Expected an invalid configuration, got {:?}", other),
    }
}

#[test]
fn when_loading_the_reference_configuration_it_should_succeed() {
    let config = ControlConfig::from_toml_str(REFERENCE_CONFIG).unwrap();

    assert_eq!(config.period_s, 0.02);
    assert_eq!(config.limits.module_offsets.len(), 4);
    assert_eq!(config.controller.translation.k_p, 2.4);
    assert_eq!(config.controller.rotation.k_p, 1.3);
    assert_eq!(config.controller.translation.k_i, 0.0);
    assert!(!config.setpoint.enforce_drive_acceleration);
    assert_eq!(config.trajectory.max_friction_acceleration, 6.0);
    assert_eq!(config.trajectory.start_velocity, 0.0);

    let limits = config.kinodynamic_limits().unwrap();
    assert_eq!(limits.max_steering_velocity(), 10.0);
    assert_eq!(limits.number_of_modules(), 4);
}

#[test]
fn when_optional_sections_are_missing_it_should_use_the_defaults() {
    let config = ControlConfig::from_toml_str(MINIMAL_CONFIG).unwrap();

    assert_eq!(config.controller, ControllerParams::default());
    assert_eq!(config.setpoint, SetpointGeneratorParams::default());
    assert_eq!(config.trajectory.sample_spacing, 0.05);
    assert_eq!(config.trajectory.end_velocity, 0.0);
}

#[test]
fn when_a_limit_is_negative_it_should_fail() {
    let text = MINIMAL_CONFIG.replace("max_drive_acceleration = 2.0", "max_drive_acceleration = -2.0");

    assert_eq!(invalid_name(ControlConfig::from_toml_str(&text)), "max_drive_acceleration");
}

#[test]
fn when_the_period_is_zero_it_should_fail() {
    let text = MINIMAL_CONFIG.replace("period_s = 0.01", "period_s = 0.0");

    assert_eq!(invalid_name(ControlConfig::from_toml_str(&text)), "period_s");
}

#[test]
fn when_a_gain_is_negative_it_should_fail() {
    let text = format!("{}\n[controller.translation]\nk_p = 1.0\n\n[controller.rotation]\nk_p = -1.0\n", MINIMAL_CONFIG);

    assert_eq!(
        invalid_name(ControlConfig::from_toml_str(&text)),
        "controller.rotation.k_p"
    );
}

#[test]
fn when_the_friction_budget_is_missing_it_should_fail_to_load() {
    let text = MINIMAL_CONFIG.replace("max_friction_acceleration = 5.0", "");

    assert!(matches!(
        ControlConfig::from_toml_str(&text),
        Err(Error::ConfigurationLoad(_))
    ));
}

#[test]
fn when_the_text_is_not_toml_it_should_fail_to_load() {
    assert!(matches!(
        ControlConfig::from_toml_str("period_s = [0.01"),
        Err(Error::ConfigurationLoad(_))
    ));
}

#[test]
fn when_the_file_does_not_exist_it_should_fail_to_load() {
    assert!(matches!(
        ControlConfig::load("does/not/exist.toml"),
        Err(Error::ConfigurationLoad(_))
    ));
}

#[test]
fn when_loading_the_reference_file_it_should_match_the_parsed_text() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("params")
        .join("swerve_control.toml");

    let loaded = ControlConfig::load(path).unwrap();

    assert_eq!(loaded, ControlConfig::from_toml_str(REFERENCE_CONFIG).unwrap());
}
