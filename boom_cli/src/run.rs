//! Config mapping, hardware (or simulation) assembly, and command execution.

use std::time::Duration;

use boom_config::Config;
use boom_core::error::Result;
use boom_core::runner::{self, RunParams, RunSummary};
use boom_core::{AccelerationSample, RunFlag, SensorReader};
use boom_traits::clock::MonotonicClock;

pub fn params_from(cfg: &Config) -> RunParams {
    RunParams {
        servo: (&cfg.servo).into(),
        sampler: (&cfg.sensor).into(),
        control: (&cfg.control).into(),
    }
}

#[cfg(not(feature = "hardware"))]
fn sim_profile(sim: &boom_config::Simulation) -> boom_hardware::SimProfile {
    use boom_config::SimProfileKind;
    use boom_hardware::SimProfile;

    match sim.profile {
        SimProfileKind::Tilt => SimProfile::Tilt {
            amplitude_ms2: sim.amplitude_ms2,
            period: Duration::from_millis(sim.period_ms),
        },
        SimProfileKind::Constant => SimProfile::Constant {
            x_ms2: sim.constant_x_ms2,
        },
        SimProfileKind::Silent => SimProfile::Silent,
    }
}

/// Open the accelerometer described by `cfg` and wrap it in a (not yet started) reader.
pub fn open_reader(cfg: &Config) -> Result<SensorReader> {
    let sampler: boom_core::SamplerCfg = (&cfg.sensor).into();

    #[cfg(feature = "hardware")]
    {
        let (bus, address, bus_hz) = (cfg.pins.i2c_bus, cfg.pins.i2c_address, cfg.sensor.bus_hz);
        SensorReader::initialize(
            move || {
                boom_hardware::mpu9250::Mpu9250::open(bus, address, bus_hz)
                    .map_err(|e| -> Box<dyn std::error::Error + Send + Sync> { Box::new(e) })
            },
            sampler,
            MonotonicClock::new(),
        )
    }
    #[cfg(not(feature = "hardware"))]
    {
        let profile = sim_profile(&cfg.simulation);
        tracing::info!(?profile, "using simulated accelerometer");
        SensorReader::initialize(
            move || {
                Ok::<_, Box<dyn std::error::Error + Send + Sync>>(
                    boom_hardware::SimulatedSensor::new(profile),
                )
            },
            sampler,
            MonotonicClock::new(),
        )
    }
}

/// Clear `flag` after `after`, from a detached timer thread.
fn stop_after(flag: &RunFlag, after: Duration) {
    let flag = flag.clone();
    std::thread::spawn(move || {
        std::thread::sleep(after);
        tracing::info!(after_ms = after.as_millis() as u64, "run duration elapsed");
        flag.clear();
    });
}

/// Full controller run. Blocks until `shutdown` is cleared, the duration elapses, or a
/// fault stops sampling.
pub fn run_controller(
    cfg: &Config,
    duration_ms: Option<u64>,
    shutdown: &RunFlag,
) -> Result<RunSummary> {
    let params = params_from(cfg);
    let reader = open_reader(cfg)?;

    if let Some(ms) = duration_ms {
        stop_after(shutdown, Duration::from_millis(ms));
    }

    #[cfg(feature = "hardware")]
    let pwm = boom_hardware::servo_pwm::HardwareServoPwm::open(cfg.pins.pwm_channel).map_err(
        |e| eyre::Report::new(boom_core::hw_error::map_hw_error(&e)),
    )?;
    #[cfg(not(feature = "hardware"))]
    let pwm = boom_hardware::SimulatedPwm::new();

    runner::run_reader(reader, pwm, &params, shutdown.clone())
}

/// Sensor-only health check.
pub fn self_check(cfg: &Config, shutdown: &RunFlag) -> Result<(u32, AccelerationSample)> {
    let control: boom_core::ControlCfg = (&cfg.control).into();
    let reader = open_reader(cfg)?;
    runner::self_check(reader, &control, shutdown)
}
