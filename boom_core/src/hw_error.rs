//! Maps `Box<dyn Error>` from trait boundaries to typed `BoomError`.
//!
//! The traits in `boom_traits` use `Box<dyn Error + Send + Sync>` so drivers stay
//! free to pick their own error types; this module converts those to our typed enum,
//! with an optional feature-gated path for `boom_hardware::HwError` downcasting.

use crate::error::BoomError;

/// Map a trait-boundary error to a typed `BoomError`.
///
/// Known hardware error types are downcast first; anything else is treated as a
/// transport failure on the bus.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> BoomError {
    #[cfg(feature = "hardware-errors")]
    {
        use boom_hardware::error::HwError;
        if let Some(hw) = e.downcast_ref::<HwError>() {
            return match hw {
                HwError::UnknownDevice { .. } => BoomError::SensorInit(hw.to_string()),
                HwError::I2c(_) | HwError::Pwm(_) => BoomError::Bus(hw.to_string()),
                other => BoomError::HardwareFault(other.to_string()),
            };
        }
    }

    BoomError::Bus(e.to_string())
}
