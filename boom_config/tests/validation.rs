use boom_config::{Config, SimProfileKind, load_file, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

const FULL: &str = r#"
[pins]
i2c_bus = 1
i2c_address = 0x68
pwm_channel = 1

[sensor]
bus_hz = 400000
sample_interval_us = 100

[servo]
min_deg = 0.0
mid_deg = 90.0
max_deg = 180.0
deg_times = 10
min_duty = 1000
max_duty = 9000
pwm_frequency_hz = 50

[control]
tolerance_ms2 = 0.1
gravity_ms2 = 9.80665
step_interval_ms = 10
settle_ms = 1000
calibration_attempts = 1000000
calibration_poll_us = 100

[logging]
level = "info"
rotation = "daily"

[simulation]
profile = "constant"
constant_x_ms2 = -4.9
"#;

#[test]
fn empty_document_yields_valid_defaults() {
    let cfg = load_toml("").expect("parse empty TOML");
    cfg.validate().expect("defaults should validate");
    assert_eq!(cfg.pins.i2c_address, 0x68);
    assert_eq!(cfg.servo.max_duty, 9000);
    assert_eq!(cfg.control.calibration_attempts, 1_000_000);
    assert_eq!(cfg.simulation.profile, SimProfileKind::Tilt);
}

#[test]
fn full_document_round_trips_values() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.pins.pwm_channel, 1);
    assert_eq!(cfg.sensor.bus_hz, 400_000);
    assert_eq!(cfg.control.gravity_ms2, 9.80665);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
    assert_eq!(cfg.simulation.profile, SimProfileKind::Constant);
    assert_eq!(cfg.simulation.constant_x_ms2, -4.9);
}

#[rstest]
#[case("[servo]\nmin_deg = 180.0\nmax_deg = 0.0", "min_deg must be < servo.max_deg")]
#[case("[servo]\nmid_deg = 200.0", "mid_deg must lie within")]
#[case("[servo]\nmin_duty = 9000\nmax_duty = 1000", "min_duty must be < servo.max_duty")]
#[case("[servo]\ndeg_times = 0", "deg_times must be >= 1")]
#[case("[servo]\npwm_frequency_hz = 0", "pwm_frequency_hz must be in")]
#[case("[control]\ngravity_ms2 = 0.0", "gravity_ms2 must be > 0")]
#[case("[control]\ntolerance_ms2 = -0.1", "tolerance_ms2 must be >= 0")]
#[case("[control]\nstep_interval_ms = 0", "step_interval_ms must be >= 1")]
#[case("[control]\ncalibration_attempts = 0", "calibration_attempts must be >= 1")]
#[case("[pins]\npwm_channel = 2", "pwm_channel must be 0 or 1")]
#[case("[pins]\ni2c_address = 0x80", "7-bit")]
#[case("[sensor]\nbus_hz = 0", "bus_hz must be > 0")]
#[case("[logging]\nrotation = \"weekly\"", "rotation must be one of")]
#[case("[simulation]\nperiod_ms = 0", "period_ms must be >= 1")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(
        format!("{err}").contains(needle),
        "error {err} does not mention {needle}"
    );
}

#[test]
fn unknown_simulation_profile_is_a_parse_error() {
    let err = load_toml("[simulation]\nprofile = \"wobble\"").expect_err("unknown profile");
    assert!(format!("{err}").contains("wobble"));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let cfg = load_file(&dir.path().join("absent.toml")).expect("defaults");
    assert_eq!(cfg.servo.mid_deg, Config::default().servo.mid_deg);
}

#[test]
fn unparsable_file_names_the_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[servo\nmin_deg = ").unwrap();
    let err = load_file(&path).expect_err("broken TOML");
    assert!(format!("{err}").contains("broken.toml"));
}
