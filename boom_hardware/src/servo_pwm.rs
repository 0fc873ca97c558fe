use rppal::pwm::{Channel, Polarity, Pwm};
use tracing::debug;

use crate::duty_fraction;
use crate::error::{HwError, Result};

/// Hardware PWM channel driving the servo signal line.
///
/// On a Raspberry Pi, channel 0 is GPIO12/18 and channel 1 is GPIO13/19 depending on
/// the `pwm` overlay.
pub struct HardwareServoPwm {
    pwm: Pwm,
    duty: u16,
}

impl HardwareServoPwm {
    pub fn open(channel: u8) -> Result<Self> {
        let ch = match channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            other => return Err(HwError::Pwm(format!("unsupported pwm channel {other}"))),
        };
        // 50 Hz with zero duty; the first duty write positions the servo.
        let mut pwm = Pwm::with_frequency(ch, 50.0, 0.0, Polarity::Normal, true)?;
        // Keep the channel enabled after exit so the servo holds its last position.
        pwm.set_reset_on_drop(false);
        debug!(channel, "pwm channel opened");
        Ok(Self { pwm, duty: 0 })
    }
}

impl boom_traits::Pwm for HardwareServoPwm {
    fn set_frequency(&mut self, hz: u32) -> boom_traits::HwResult<()> {
        self.pwm
            .set_frequency(f64::from(hz), duty_fraction(self.duty))
            .map_err(HwError::from)?;
        debug!(hz, "pwm frequency set");
        Ok(())
    }

    fn set_duty(&mut self, duty: u16) -> boom_traits::HwResult<()> {
        self.pwm
            .set_duty_cycle(duty_fraction(duty))
            .map_err(HwError::from)?;
        self.duty = duty;
        Ok(())
    }
}
