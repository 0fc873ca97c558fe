//! Servo actuator: angle bookkeeping, clamping and angle→duty conversion.

use boom_traits::Pwm;
use tracing::{debug, info};

use crate::config::ServoCfg;
use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Clamp an angle into `[min_deg, max_deg]`. NaN clamps to `min_deg`.
#[inline]
pub fn clamp_degree(cfg: &ServoCfg, degree: f64) -> f64 {
    if degree > cfg.max_deg {
        cfg.max_deg
    } else if degree >= cfg.min_deg {
        degree
    } else {
        cfg.min_deg
    }
}

/// Linear angle→duty interpolation, truncated toward zero.
///
/// Expects an already clamped angle; the result then lies in `[min_duty, max_duty]`.
#[inline]
pub fn degree_to_duty(cfg: &ServoCfg, degree: f64) -> u16 {
    let span = f64::from(cfg.max_duty.saturating_sub(cfg.min_duty));
    let duty = f64::from(cfg.min_duty) + span * (degree / cfg.max_deg);
    duty as u16
}

/// Nominal angle step (degrees) for a 1 g reading:
/// `floor(max_deg * deg_times / (max_duty - min_duty) * deg_times)`.
pub fn deg_step(cfg: &ServoCfg) -> f64 {
    let range = cfg.max_deg * f64::from(cfg.deg_times);
    let span = f64::from(cfg.max_duty.saturating_sub(cfg.min_duty).max(1));
    (range / span * f64::from(cfg.deg_times)).floor()
}

/// Hobby servo on a PWM output.
pub struct Servo<P: Pwm> {
    pwm: P,
    cfg: ServoCfg,
    angle: Option<f64>,
    duty: Option<u16>,
}

impl<P: Pwm> core::fmt::Debug for Servo<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Servo")
            .field("angle", &self.angle)
            .field("duty", &self.duty)
            .finish()
    }
}

impl<P: Pwm> Servo<P> {
    /// Claim the PWM output and set the servo frame rate. The angle starts unset.
    pub fn initialize(mut pwm: P, cfg: ServoCfg) -> Result<Self> {
        info!(hz = cfg.pwm_frequency_hz, "servo starting");
        pwm.set_frequency(cfg.pwm_frequency_hz)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
        Ok(Self {
            pwm,
            cfg,
            angle: None,
            duty: None,
        })
    }

    /// Move to `degree`, silently clamped into range. Returns the applied angle.
    pub fn set_angle(&mut self, degree: f64) -> Result<f64> {
        let clamped = clamp_degree(&self.cfg, degree);
        let duty = degree_to_duty(&self.cfg, clamped);
        // Only a written duty counts as a position.
        self.pwm
            .set_duty(duty)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e)))?;
        self.angle = Some(clamped);
        self.duty = Some(duty);
        if clamped != degree {
            debug!(requested = degree, applied = clamped, "servo angle clamped");
        }
        Ok(clamped)
    }

    /// Log shutdown. The PWM output stays energized so the servo holds its last position.
    pub fn stop(&mut self) {
        info!(angle = ?self.angle, "servo stopped");
    }

    /// Last commanded angle, if any.
    pub fn angle(&self) -> Option<f64> {
        self.angle
    }

    /// Last duty written to the PWM output, if any.
    pub fn duty(&self) -> Option<u16> {
        self.duty
    }

    pub fn cfg(&self) -> &ServoCfg {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_step_is_two_degrees() {
        // 1800 / 8000 * 10 = 2.25
        assert_eq!(deg_step(&ServoCfg::default()), 2.0);
    }

    #[test]
    fn endpoints_map_to_duty_limits() {
        let cfg = ServoCfg::default();
        assert_eq!(degree_to_duty(&cfg, 0.0), 1000);
        assert_eq!(degree_to_duty(&cfg, 90.0), 5000);
        assert_eq!(degree_to_duty(&cfg, 180.0), 9000);
    }

    #[test]
    fn duty_is_truncated() {
        let cfg = ServoCfg::default();
        // 1000 + 8000 * (1/180) = 1044.44..
        assert_eq!(degree_to_duty(&cfg, 1.0), 1044);
    }

    #[test]
    fn clamp_handles_nan_and_infinities() {
        let cfg = ServoCfg::default();
        assert_eq!(clamp_degree(&cfg, f64::NAN), 0.0);
        assert_eq!(clamp_degree(&cfg, f64::INFINITY), 180.0);
        assert_eq!(clamp_degree(&cfg, f64::NEG_INFINITY), 0.0);
        assert_eq!(clamp_degree(&cfg, 42.5), 42.5);
    }
}
