//! Configuration types for the control engine.
//!
//! These are the runtime configuration structs used by the servo driver, the sensor
//! reader and the control loop. They are separate from the TOML-deserialized config in
//! `boom_config`; see `conversions` for the mapping.

use std::time::Duration;

/// Servo geometry and PWM encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ServoCfg {
    /// Lowest commandable angle (degrees).
    pub min_deg: f64,
    /// Centre position taken after calibration (degrees).
    pub mid_deg: f64,
    /// Highest commandable angle (degrees).
    pub max_deg: f64,
    /// Angle resolution multiplier used to derive the per-g step size.
    pub deg_times: u32,
    /// Duty at `min_deg`.
    pub min_duty: u16,
    /// Duty at `max_deg`.
    pub max_duty: u16,
    /// Servo frame rate.
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

/// Background sampling configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerCfg {
    /// Pause before each sensor read (µs).
    pub interval_us: u64,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self { interval_us: 100 }
    }
}

impl SamplerCfg {
    #[inline]
    pub fn interval(&self) -> Duration {
        Duration::from_micros(self.interval_us)
    }
}

/// Control loop tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlCfg {
    /// Dead-band in m/s²; smaller |x| commands nothing.
    pub tolerance_ms2: f64,
    /// Divisor normalizing acceleration into g.
    pub gravity_ms2: f64,
    /// Pause between angle updates (ms).
    pub step_interval_ms: u64,
    /// Hold time after centering the servo at the end of calibration (ms).
    pub settle_ms: u64,
    /// Upper bound on polls while waiting for the first nonzero x reading.
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

impl ControlCfg {
    #[inline]
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }

    #[inline]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    #[inline]
    pub fn calibration_poll(&self) -> Duration {
        Duration::from_micros(self.calibration_poll_us)
    }
}
