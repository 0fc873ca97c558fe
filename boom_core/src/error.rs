use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BoomError {
    #[error("bus error: {0}")]
    Bus(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("sensor init failed: {0}")]
    SensorInit(String),
    #[error("no sensor detected after {attempts} calibration polls")]
    NoSensorDetected { attempts: u32 },
    #[error("stopped by request before the accelerometer reported")]
    Interrupted,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sensor reader")]
    MissingSensor,
    #[error("missing actuator")]
    MissingActuator,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
