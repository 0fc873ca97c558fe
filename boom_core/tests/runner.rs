//! End-to-end runs on the real clock with shortened pauses.

use std::time::Duration;

use boom_core::error::BoomError;
use boom_core::mocks::{RecordingPwm, ScriptedSensor};
use boom_core::runner::{self, RunParams};
use boom_core::{ControlCfg, RunFlag, SamplerCfg, SensorReader};
use boom_traits::clock::MonotonicClock;

fn fast_params() -> RunParams {
    RunParams {
        control: ControlCfg {
            settle_ms: 0,
            step_interval_ms: 1,
            calibration_attempts: 2_000,
            ..ControlCfg::default()
        },
        ..RunParams::default()
    }
}

fn clear_after(flag: &RunFlag, after: Duration) -> std::thread::JoinHandle<()> {
    let flag = flag.clone();
    std::thread::spawn(move || {
        std::thread::sleep(after);
        flag.clear();
    })
}

#[test]
fn tilted_run_moves_up_and_stops_on_request() {
    let pwm = RecordingPwm::new();
    let shutdown = RunFlag::raised();
    let stopper = clear_after(&shutdown, Duration::from_millis(50));

    let summary = runner::run(
        ScriptedSensor::new((4.903, 0.0, 8.49)),
        pwm.clone(),
        fast_params(),
        shutdown,
    )
    .unwrap();
    stopper.join().unwrap();

    assert!(summary.moves > 0);
    assert!(summary.samples > 0);
    assert!(summary.final_angle.unwrap() > 90.0);
    assert_eq!(pwm.duties()[0], 5000);
    let duties = pwm.duties();
    assert!(duties.windows(2).all(|w| w[0] <= w[1]), "{duties:?}");
}

#[test]
fn silent_sensor_fails_calibration() {
    let pwm = RecordingPwm::new();
    let err = runner::run(
        ScriptedSensor::new((0.0, 0.0, 0.0)),
        pwm.clone(),
        fast_params(),
        RunFlag::raised(),
    )
    .expect_err("no sensor");
    assert!(matches!(
        err.downcast_ref::<BoomError>(),
        Some(BoomError::NoSensorDetected { .. })
    ));
    assert!(pwm.duties().is_empty());
}

#[test]
fn sensor_fault_mid_run_is_returned() {
    let sensor = ScriptedSensor::new((0.05, 0.0, 9.8));
    let failing = sensor.clone();
    let trigger = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        failing.fail_with("cable pulled");
    });

    let err = runner::run(sensor, RecordingPwm::new(), fast_params(), RunFlag::raised())
        .expect_err("fault");
    trigger.join().unwrap();
    assert_eq!(
        err.downcast_ref::<BoomError>(),
        Some(&BoomError::Bus("cable pulled".into()))
    );
}

#[test]
fn self_check_reports_first_reading() {
    let reader = SensorReader::new(
        ScriptedSensor::new((0.25, 0.0, 9.8)),
        SamplerCfg::default(),
        MonotonicClock::new(),
    );
    let (polls, sample) = runner::self_check(
        reader,
        &fast_params().control,
        &RunFlag::raised(),
    )
    .unwrap();
    assert!(polls >= 1);
    assert_eq!(sample.x, 0.25);
}

#[test]
fn self_check_stops_when_shutdown_is_cleared() {
    let reader = SensorReader::new(
        ScriptedSensor::new((0.0, 0.0, 0.0)),
        SamplerCfg::default(),
        MonotonicClock::new(),
    );
    let err = runner::self_check(reader, &fast_params().control, &RunFlag::new())
        .expect_err("interrupted");
    assert_eq!(err.downcast_ref::<BoomError>(), Some(&BoomError::Interrupted));
}
