use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("i2c error: {0}")]
    I2c(String),
    #[error("pwm error: {0}")]
    Pwm(String),
    #[error("unrecognized accelerometer (WHO_AM_I=0x{who_am_i:02x})")]
    UnknownDevice { who_am_i: u8 },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "hardware")]
impl From<rppal::i2c::Error> for HwError {
    fn from(e: rppal::i2c::Error) -> Self {
        HwError::I2c(e.to_string())
    }
}

#[cfg(feature = "hardware")]
impl From<rppal::pwm::Error> for HwError {
    fn from(e: rppal::pwm::Error) -> Self {
        HwError::Pwm(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HwError>;
