//! `From` implementations bridging `boom_config` types to `boom_core` types.

use crate::config::{ControlCfg, SamplerCfg, ServoCfg};

// ── ServoCfg ─────────────────────────────────────────────────────────────────

impl From<&boom_config::ServoCfg> for ServoCfg {
    fn from(c: &boom_config::ServoCfg) -> Self {
        Self {
            min_deg: c.min_deg,
            mid_deg: c.mid_deg,
            max_deg: c.max_deg,
            deg_times: c.deg_times,
            min_duty: c.min_duty,
            max_duty: c.max_duty,
            pwm_frequency_hz: c.pwm_frequency_hz,
        }
    }
}

// ── SamplerCfg ───────────────────────────────────────────────────────────────

impl From<&boom_config::SensorCfg> for SamplerCfg {
    fn from(c: &boom_config::SensorCfg) -> Self {
        Self {
            interval_us: c.sample_interval_us,
        }
    }
}

// ── ControlCfg ───────────────────────────────────────────────────────────────

impl From<&boom_config::ControlCfg> for ControlCfg {
    fn from(c: &boom_config::ControlCfg) -> Self {
        Self {
            tolerance_ms2: c.tolerance_ms2,
            gravity_ms2: c.gravity_ms2,
            step_interval_ms: c.step_interval_ms,
            settle_ms: c.settle_ms,
            calibration_attempts: c.calibration_attempts,
            calibration_poll_us: c.calibration_poll_us,
        }
    }
}
