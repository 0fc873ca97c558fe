//! Hardware seams shared by the boom controller crates.
//!
//! Drivers report failures as boxed errors so the core stays independent of any
//! particular bus implementation; `boom_core::hw_error` maps them back to typed errors.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

pub type HwResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Tri-axis accelerometer.
pub trait AccelSensor {
    /// Read one (x, y, z) acceleration triple in m/s².
    fn read_axes(&mut self) -> HwResult<(f64, f64, f64)>;
}

/// PWM output driving a hobby servo.
pub trait Pwm {
    fn set_frequency(&mut self, hz: u32) -> HwResult<()>;
    /// Set the duty cycle as a 16-bit fraction of the period (0 = off, 65535 = always on).
    fn set_duty(&mut self, duty: u16) -> HwResult<()>;
}

impl<T: AccelSensor + ?Sized> AccelSensor for Box<T> {
    fn read_axes(&mut self) -> HwResult<(f64, f64, f64)> {
        (**self).read_axes()
    }
}

impl<T: Pwm + ?Sized> Pwm for Box<T> {
    fn set_frequency(&mut self, hz: u32) -> HwResult<()> {
        (**self).set_frequency(hz)
    }

    fn set_duty(&mut self, duty: u16) -> HwResult<()> {
        (**self).set_duty(duty)
    }
}
