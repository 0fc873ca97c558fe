//! One-call orchestration: servo + sensor reader + control loop.

use boom_traits::clock::MonotonicClock;
use boom_traits::{AccelSensor, Pwm};
use tracing::info;

use crate::actuator::Servo;
use crate::atomic::RunFlag;
use crate::config::{ControlCfg, SamplerCfg, ServoCfg};
use crate::control::{ControlLoop, wait_for_sensor};
use crate::error::Result;
use crate::sampler::SensorReader;
use crate::types::AccelerationSample;

/// Tuning for a full run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunParams {
    pub servo: ServoCfg,
    pub sampler: SamplerCfg,
    pub control: ControlCfg,
}

/// What a finished run left behind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Last commanded angle; the servo holds it after exit.
    pub final_angle: Option<f64>,
    pub moves: u64,
    pub samples: u64,
}

/// Drive the servo from `sensor` until `shutdown` is cleared or sampling fails.
pub fn run<S, P>(sensor: S, pwm: P, params: RunParams, shutdown: RunFlag) -> Result<RunSummary>
where
    S: AccelSensor + Send + 'static,
    P: Pwm,
{
    let reader = SensorReader::new(sensor, params.sampler.clone(), MonotonicClock::new());
    run_reader(reader, pwm, &params, shutdown)
}

/// Like `run`, for a reader the caller already opened (see `SensorReader::initialize`).
///
/// Calibration runs first. Whatever the outcome, sampling is stopped before returning
/// and the servo is left at its last position.
pub fn run_reader<P: Pwm>(
    mut reader: SensorReader,
    pwm: P,
    params: &RunParams,
    shutdown: RunFlag,
) -> Result<RunSummary> {
    let servo = Servo::initialize(pwm, params.servo.clone())?;
    reader.start()?;

    let mut control = ControlLoop::builder()
        .with_sensor(reader)
        .with_actuator(servo)
        .with_control(params.control.clone())
        .with_shutdown(shutdown)
        .build()?;

    let outcome = control.run();
    control.stop();
    outcome?;

    let summary = RunSummary {
        final_angle: control.angle(),
        moves: control.moves(),
        samples: control.sensor().sample_count(),
    };
    info!(?summary, "run finished");
    Ok(summary)
}

/// Start sampling and wait for the first live reading, without touching any actuator.
pub fn self_check(
    mut reader: SensorReader,
    control: &ControlCfg,
    shutdown: &RunFlag,
) -> Result<(u32, AccelerationSample)> {
    reader.start()?;
    let detected = wait_for_sensor(&reader, control, &MonotonicClock::new(), Some(shutdown));
    reader.stop();
    detected
}
