use boom_core::error::{BoomError, BuildError};
use boom_core::hw_error::map_hw_error;

#[test]
fn error_messages_name_the_problem() {
    assert_eq!(
        BoomError::NoSensorDetected { attempts: 1_000_000 }.to_string(),
        "no sensor detected after 1000000 calibration polls"
    );
    assert_eq!(
        BoomError::Bus("nack".into()).to_string(),
        "bus error: nack"
    );
    assert_eq!(
        BuildError::InvalidConfig("gravity_ms2 must be > 0").to_string(),
        "invalid config: gravity_ms2 must be > 0"
    );
}

#[test]
fn typed_errors_survive_the_report_wrapper() {
    let report = eyre::Report::new(BoomError::SensorInit("who am i".into()));
    let report = report.wrap_err("starting up");
    assert!(matches!(
        report.downcast_ref::<BoomError>(),
        Some(BoomError::SensorInit(_))
    ));
}

#[test]
fn driver_errors_default_to_bus_errors() {
    let e: Box<dyn std::error::Error + Send + Sync> = Box::new(std::io::Error::other("eio"));
    assert_eq!(map_hw_error(&*e), BoomError::Bus("eio".into()));
}
