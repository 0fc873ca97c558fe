#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the boom controller.
//!
//! `Config` and its sections are deserialized from TOML and checked by `validate()`.
//! Every section has defaults, so an empty document yields the stock board setup:
//! MPU9250 on I2C bus 1 at 0x68, servo on PWM channel 1 (GPIO13).
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// Linux I2C bus number (`/dev/i2c-N`).
    pub i2c_bus: u8,
    /// 7-bit sensor address; 0x68 with AD0 low, 0x69 with AD0 high.
    pub i2c_address: u16,
    /// Hardware PWM channel driving the servo (0 or 1).
    pub pwm_channel: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            i2c_bus: 1,
            i2c_address: 0x68,
            pwm_channel: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorCfg {
    /// Expected I2C clock in Hz.
    pub bus_hz: u32,
    /// Pause between consecutive sensor reads (µs).
    pub sample_interval_us: u64,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            bus_hz: 400_000,
            sample_interval_us: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServoCfg {
    pub min_deg: f64,
    pub mid_deg: f64,
    pub max_deg: f64,
    /// Angle resolution multiplier used to derive the per-g step size.
    pub deg_times: u32,
    pub min_duty: u16,
    pub max_duty: u16,
    pub pwm_frequency_hz: u32,
}

impl Default for ServoCfg {
    fn default() -> Self {
        Self {
            min_deg: 0.0,
            mid_deg: 90.0,
            max_deg: 180.0,
            deg_times: 10,
            min_duty: 1000,
            max_duty: 9000,
            pwm_frequency_hz: 50,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlCfg {
    /// Dead-band: |x| below this (m/s²) commands nothing.
    pub tolerance_ms2: f64,
    /// Divisor normalizing acceleration into g.
    pub gravity_ms2: f64,
    /// Pause between angle updates (ms).
    pub step_interval_ms: u64,
    /// Hold time after centering the servo at startup (ms).
    pub settle_ms: u64,
    /// Upper bound on sensor polls while waiting for the first nonzero reading.
    pub calibration_attempts: u32,
    /// Pause between calibration polls (µs).
    pub calibration_poll_us: u64,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            tolerance_ms2: 0.1,
            gravity_ms2: 9.80665,
            step_interval_ms: 10,
            settle_ms: 1000,
            calibration_attempts: 1_000_000,
            calibration_poll_us: 100,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SimProfileKind {
    #[default]
    Tilt,
    Constant,
    Silent,
}

/// Motion replayed by the simulated sensor when built without the `hardware` feature.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    pub profile: SimProfileKind,
    pub amplitude_ms2: f64,
    pub period_ms: u64,
    pub constant_x_ms2: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            profile: SimProfileKind::Tilt,
            amplitude_ms2: 4.0,
            period_ms: 4000,
            constant_x_ms2: 4.903,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pins: Pins,
    pub sensor: SensorCfg,
    pub servo: ServoCfg,
    pub control: ControlCfg,
    pub logging: Logging,
    pub simulation: Simulation,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file; a missing file yields the defaults.
pub fn load_file(path: &std::path::Path) -> eyre::Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
        Err(e) => Err(eyre::eyre!("read config {:?}: {}", path, e)),
    }
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Pins
        if self.pins.i2c_address > 0x7F {
            eyre::bail!("pins.i2c_address must be a 7-bit address");
        }
        if self.pins.pwm_channel > 1 {
            eyre::bail!("pins.pwm_channel must be 0 or 1");
        }

        // Sensor
        if self.sensor.bus_hz == 0 {
            eyre::bail!("sensor.bus_hz must be > 0");
        }
        if self.sensor.sample_interval_us > 1_000_000 {
            eyre::bail!("sensor.sample_interval_us is unreasonably large (>1s)");
        }

        // Servo
        let s = &self.servo;
        if !(s.min_deg.is_finite() && s.mid_deg.is_finite() && s.max_deg.is_finite()) {
            eyre::bail!("servo angles must be finite");
        }
        if s.min_deg < 0.0 {
            eyre::bail!("servo.min_deg must be >= 0");
        }
        if s.min_deg >= s.max_deg {
            eyre::bail!("servo.min_deg must be < servo.max_deg");
        }
        if s.mid_deg < s.min_deg || s.mid_deg > s.max_deg {
            eyre::bail!("servo.mid_deg must lie within [min_deg, max_deg]");
        }
        if s.deg_times == 0 {
            eyre::bail!("servo.deg_times must be >= 1");
        }
        if s.min_duty >= s.max_duty {
            eyre::bail!("servo.min_duty must be < servo.max_duty");
        }
        if s.pwm_frequency_hz == 0 || s.pwm_frequency_hz > 400 {
            eyre::bail!("servo.pwm_frequency_hz must be in [1, 400]");
        }

        // Control
        let c = &self.control;
        if !(c.tolerance_ms2.is_finite() && c.tolerance_ms2 >= 0.0) {
            eyre::bail!("control.tolerance_ms2 must be >= 0");
        }
        if !(c.gravity_ms2.is_finite() && c.gravity_ms2 > 0.0) {
            eyre::bail!("control.gravity_ms2 must be > 0");
        }
        if c.step_interval_ms == 0 {
            eyre::bail!("control.step_interval_ms must be >= 1");
        }
        if c.settle_ms > 60_000 {
            eyre::bail!("control.settle_ms is unreasonably large (>1min)");
        }
        if c.calibration_attempts == 0 {
            eyre::bail!("control.calibration_attempts must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref() {
            if !matches!(rot, "never" | "daily" | "hourly") {
                eyre::bail!("logging.rotation must be one of never|daily|hourly");
            }
        }

        // Simulation
        if self.simulation.profile == SimProfileKind::Tilt && self.simulation.period_ms == 0 {
            eyre::bail!("simulation.period_ms must be >= 1 for the tilt profile");
        }

        Ok(())
    }
}
