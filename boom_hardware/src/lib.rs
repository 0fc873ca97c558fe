pub mod error;

#[cfg(feature = "hardware")]
pub mod mpu9250;
#[cfg(feature = "hardware")]
pub mod servo_pwm;

use boom_traits::{AccelSensor, HwResult, Pwm};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Standard gravity in m/s².
pub const STANDARD_GRAVITY: f64 = 9.80665;

/// Accelerometer counts per g at the ±2 g full-scale range.
pub const COUNTS_PER_G_2G: f64 = 16384.0;

/// Convert a signed ±2 g accelerometer count to m/s².
#[inline]
pub fn accel_counts_to_ms2(raw: i16) -> f64 {
    f64::from(raw) / COUNTS_PER_G_2G * STANDARD_GRAVITY
}

/// Convert a 16-bit duty value to the fractional duty cycle PWM peripherals expect.
#[inline]
pub fn duty_fraction(duty: u16) -> f64 {
    f64::from(duty) / f64::from(u16::MAX)
}

/// Motion profile replayed by `SimulatedSensor`.
#[derive(Debug, Clone, Copy)]
pub enum SimProfile {
    /// Boom rocking back and forth: x = amplitude * sin(2π t / period).
    Tilt {
        amplitude_ms2: f64,
        period: Duration,
    },
    /// Boom held at a fixed tilt.
    Constant { x_ms2: f64 },
    /// Nothing on the bus answers; every read yields zeros.
    Silent,
}

/// Simulated accelerometer implementation
pub struct SimulatedSensor {
    profile: SimProfile,
    epoch: Instant,
}

impl SimulatedSensor {
    pub fn new(profile: SimProfile) -> Self {
        SimulatedSensor {
            profile,
            epoch: Instant::now(),
        }
    }

    fn x_now(&self) -> f64 {
        match self.profile {
            SimProfile::Tilt {
                amplitude_ms2,
                period,
            } => {
                let period_s = period.as_secs_f64().max(f64::EPSILON);
                let t = self.epoch.elapsed().as_secs_f64();
                amplitude_ms2 * (std::f64::consts::TAU * t / period_s).sin()
            }
            SimProfile::Constant { x_ms2 } => x_ms2,
            SimProfile::Silent => 0.0,
        }
    }
}

impl AccelSensor for SimulatedSensor {
    fn read_axes(&mut self) -> HwResult<(f64, f64, f64)> {
        if matches!(self.profile, SimProfile::Silent) {
            return Ok((0.0, 0.0, 0.0));
        }
        let x = self.x_now();
        // Whatever tilt is not seen on x shows up on z.
        let z = (STANDARD_GRAVITY * STANDARD_GRAVITY - x * x).max(0.0).sqrt();
        tracing::trace!(x, z, "simulated accel read");
        Ok((x, 0.0, z))
    }
}

#[derive(Debug, Default)]
struct PwmLog {
    frequency_hz: Option<u32>,
    duty: Option<u16>,
    writes: usize,
}

/// Simulated servo PWM output; clones share the same state so a caller can
/// observe what the controller commanded.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPwm {
    log: Arc<Mutex<PwmLog>>,
}

impl SimulatedPwm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequency_hz(&self) -> Option<u32> {
        self.log.lock().map(|l| l.frequency_hz).unwrap_or(None)
    }

    pub fn duty(&self) -> Option<u16> {
        self.log.lock().map(|l| l.duty).unwrap_or(None)
    }

    /// Number of duty writes received so far.
    pub fn writes(&self) -> usize {
        self.log.lock().map(|l| l.writes).unwrap_or(0)
    }
}

impl Pwm for SimulatedPwm {
    fn set_frequency(&mut self, hz: u32) -> HwResult<()> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| error::HwError::Pwm("simulated pwm state poisoned".into()))?;
        log.frequency_hz = Some(hz);
        tracing::debug!(hz, "pwm frequency set (simulated)");
        Ok(())
    }

    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| error::HwError::Pwm("simulated pwm state poisoned".into()))?;
        log.duty = Some(duty);
        log.writes += 1;
        tracing::trace!(duty, "pwm duty set (simulated)");
        Ok(())
    }
}
