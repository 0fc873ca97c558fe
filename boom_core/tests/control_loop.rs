//! Control loop behaviour against a scripted accelerometer and a recording PWM.
//!
//! The sensor reader samples in real time; the control loop runs on a `TestClock`, so
//! settle and step pauses cost nothing.

use std::time::{Duration, Instant};

use boom_core::error::BoomError;
use boom_core::mocks::{RecordingPwm, ScriptedSensor};
use boom_core::{
    ControlCfg, ControlLoop, ControlStatus, LoopState, RunFlag, SamplerCfg, SensorReader, Servo,
    ServoCfg, wait_for_sensor,
};
use boom_traits::clock::MonotonicClock;
use boom_traits::clock::test_clock::TestClock;

fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(1));
    }
}

fn started_reader(sensor: &ScriptedSensor) -> SensorReader {
    let mut r = SensorReader::new(sensor.clone(), SamplerCfg::default(), MonotonicClock::new());
    r.start().unwrap();
    wait_until("first sample", || r.sample_count() > 0);
    r
}

struct Rig {
    sensor: ScriptedSensor,
    pwm: RecordingPwm,
    clock: TestClock,
    control: ControlLoop<RecordingPwm>,
}

fn rig(x: f64) -> Rig {
    rig_with(x, ControlCfg::default(), None)
}

fn rig_with(x: f64, cfg: ControlCfg, shutdown: Option<RunFlag>) -> Rig {
    let sensor = ScriptedSensor::new((x, 0.0, 9.8));
    let pwm = RecordingPwm::new();
    let clock = TestClock::new();
    let servo = Servo::initialize(pwm.clone(), ServoCfg::default()).unwrap();
    let mut builder = ControlLoop::builder()
        .with_sensor(started_reader(&sensor))
        .with_actuator(servo)
        .with_control(cfg)
        .with_clock(clock.clone());
    if let Some(flag) = shutdown {
        builder = builder.with_shutdown(flag);
    }
    let control = builder.build().unwrap();
    Rig {
        sensor,
        pwm,
        clock,
        control,
    }
}

/// Change the scripted x value and wait until the reader has published it.
fn retarget(rig: &Rig, x: f64) {
    rig.sensor.set_x(x);
    wait_until("new sample", || rig.control.sensor().latest().x == x);
    std::thread::sleep(Duration::from_millis(5));
}

#[test]
fn calibration_centres_servo_and_settles() {
    let rig = rig(0.05);
    assert_eq!(rig.control.state(), LoopState::Steady);
    assert_eq!(rig.control.angle(), Some(90.0));
    assert_eq!(rig.pwm.frequency_hz(), Some(50));
    assert_eq!(rig.pwm.duties(), vec![5000]);
    assert!(rig.clock.elapsed() >= Duration::from_millis(1000));
    assert_eq!(rig.control.tracked_g(), 0.05);
}

#[test]
fn dead_band_commands_nothing() {
    let mut rig = rig(0.05);
    for _ in 0..20 {
        assert_eq!(rig.control.step().unwrap(), ControlStatus::DeadBand);
    }
    assert_eq!(rig.pwm.duties(), vec![5000]);
    assert_eq!(rig.control.moves(), 0);
}

#[test]
fn half_g_tilt_moves_one_degree_up() {
    let mut rig = rig(4.903);
    let status = rig.control.step().unwrap();
    assert_eq!(status, ControlStatus::Moved { from: 90.0, to: 91.0 });
    assert_eq!(rig.pwm.duties(), vec![5000, 5044]);
}

#[test]
fn full_negative_g_moves_two_degrees_down() {
    let mut rig = rig(-9.80665);
    let status = rig.control.step().unwrap();
    assert_eq!(status, ControlStatus::Moved { from: 90.0, to: 88.0 });
    assert_eq!(rig.pwm.duties(), vec![5000, 4911]);
}

#[test]
fn sustained_tilt_saturates_at_max_angle() {
    let mut rig = rig(9.80665);
    for _ in 0..60 {
        rig.control.step().unwrap();
    }
    assert_eq!(rig.control.angle(), Some(180.0));
    assert_eq!(rig.pwm.duties().last(), Some(&9000));
    assert!(rig.pwm.duties().iter().all(|d| (1000..=9000).contains(d)));
}

#[test]
fn sustained_negative_tilt_saturates_at_min_angle() {
    let mut rig = rig(-9.80665);
    for _ in 0..60 {
        rig.control.step().unwrap();
    }
    assert_eq!(rig.control.angle(), Some(0.0));
    assert_eq!(rig.pwm.duties().last(), Some(&1000));
}

#[test]
fn loop_follows_new_samples() {
    let mut rig = rig(0.05);
    assert_eq!(rig.control.step().unwrap(), ControlStatus::DeadBand);

    retarget(&rig, 4.903);
    assert_eq!(
        rig.control.step().unwrap(),
        ControlStatus::Moved { from: 90.0, to: 91.0 }
    );
    assert_eq!(rig.control.tracked_g(), 4.903);

    retarget(&rig, 0.0);
    assert_eq!(rig.control.step().unwrap(), ControlStatus::DeadBand);
    assert_eq!(rig.control.angle(), Some(91.0));
}

#[test]
fn on_sample_reports_changes_only() {
    let mut rig = rig(0.05);
    let same = boom_core::AccelerationSample::from_axes((0.05, 1.0, 1.0));
    assert!(!rig.control.on_sample(&same));
    let moved = boom_core::AccelerationSample::from_axes((-0.3, 0.0, 0.0));
    assert!(rig.control.on_sample(&moved));
    assert_eq!(rig.control.tracked_g(), -0.3);
}

#[test]
fn run_returns_when_shutdown_is_cleared() {
    let shutdown = RunFlag::raised();
    let mut rig = rig_with(0.05, ControlCfg::default(), Some(shutdown.clone()));

    let flag = shutdown.clone();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(30));
        flag.clear();
    });
    rig.control.run().unwrap();
    stopper.join().unwrap();

    assert_eq!(rig.control.state(), LoopState::Stopped);
    assert_eq!(rig.pwm.duties(), vec![5000]);
}

#[test]
fn step_after_stop_is_a_state_error() {
    let mut rig = rig(0.05);
    rig.control.stop();
    let err = rig.control.step().expect_err("stopped loop must not step");
    assert!(matches!(
        err.downcast_ref::<BoomError>(),
        Some(BoomError::State(_))
    ));
    // The servo keeps its last command.
    assert_eq!(rig.control.angle(), Some(90.0));
}

#[test]
fn sensor_fault_ends_run_with_that_fault() {
    let mut rig = rig(0.05);
    rig.sensor.fail_with("bus gone");
    let err = rig.control.run().expect_err("fault must propagate");
    assert_eq!(
        err.downcast_ref::<BoomError>(),
        Some(&BoomError::Bus("bus gone".into()))
    );
    assert_eq!(rig.control.state(), LoopState::Stopped);
}

#[test]
fn pwm_failure_during_step_is_a_bus_error() {
    let mut rig = rig(4.903);
    rig.pwm.fail_writes();
    let err = rig.control.step().expect_err("write failure must propagate");
    assert!(matches!(
        err.downcast_ref::<BoomError>(),
        Some(BoomError::Bus(_))
    ));
}

fn build_err(sensor_x: f64, cfg: ControlCfg, shutdown: Option<RunFlag>) -> eyre::Report {
    let sensor = ScriptedSensor::new((sensor_x, 0.0, 0.0));
    let pwm = RecordingPwm::new();
    let servo = Servo::initialize(pwm.clone(), ServoCfg::default()).unwrap();
    let mut builder = ControlLoop::builder()
        .with_sensor(started_reader(&sensor))
        .with_actuator(servo)
        .with_control(cfg)
        .with_clock(TestClock::new());
    if let Some(flag) = shutdown {
        builder = builder.with_shutdown(flag);
    }
    let err = builder.build().expect_err("calibration must fail");
    assert!(pwm.duties().is_empty(), "servo moved without a sensor");
    err
}

#[test]
fn silent_sensor_exhausts_calibration_attempts() {
    let cfg = ControlCfg {
        calibration_attempts: 50,
        ..ControlCfg::default()
    };
    let err = build_err(0.0, cfg, None);
    assert_eq!(
        err.downcast_ref::<BoomError>(),
        Some(&BoomError::NoSensorDetected { attempts: 50 })
    );
}

#[test]
fn cleared_shutdown_interrupts_calibration() {
    let err = build_err(0.0, ControlCfg::default(), Some(RunFlag::new()));
    assert_eq!(err.downcast_ref::<BoomError>(), Some(&BoomError::Interrupted));
}

#[test]
fn stopped_reader_without_fault_counts_as_no_sensor() {
    let sensor = ScriptedSensor::new((0.0, 0.0, 0.0));
    let reader = started_reader(&sensor);
    reader.stop();
    wait_until("reader to stop", || !reader.is_running());

    let cfg = ControlCfg {
        calibration_attempts: 50,
        ..ControlCfg::default()
    };
    let err = wait_for_sensor(&reader, &cfg, &TestClock::new(), None).expect_err("no data");
    assert_eq!(
        err.downcast_ref::<BoomError>(),
        Some(&BoomError::NoSensorDetected { attempts: 1 })
    );
}

#[test]
fn faulted_reader_reports_its_fault() {
    let sensor = ScriptedSensor::new((0.0, 0.0, 0.0));
    let reader = started_reader(&sensor);
    sensor.fail_with("nack");
    wait_until("reader to stop", || !reader.is_running());

    let servo = Servo::initialize(RecordingPwm::new(), ServoCfg::default()).unwrap();
    let err = ControlLoop::builder()
        .with_sensor(reader)
        .with_actuator(servo)
        .with_clock(TestClock::new())
        .build()
        .expect_err("faulted reader");
    assert_eq!(
        err.downcast_ref::<BoomError>(),
        Some(&BoomError::Bus("nack".into()))
    );
}
