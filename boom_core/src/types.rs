use crate::util::round3;

/// One accelerometer reading in m/s², each axis rounded to 3 decimals.
///
/// `Copy` on purpose: consumers always hold a snapshot, never a view into the shared slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccelerationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AccelerationSample {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Build a sample from raw driver axes, applying the 3-decimal rounding.
    pub fn from_axes((x, y, z): (f64, f64, f64)) -> Self {
        Self {
            x: round3(x),
            y: round3(y),
            z: round3(z),
        }
    }
}
