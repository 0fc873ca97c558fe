//! Rounding and period helpers for boom_core.

/// Number of microseconds in one millisecond.
pub const MICROS_PER_MILLI: u64 = 1_000;

/// Round `v` to `decimals` decimal digits, halves away from zero.
/// Non-finite inputs pass through unchanged.
#[inline]
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let f = 10f64.powi(decimals);
    (v * f).round() / f
}

/// Sensor readings and normalized g values are kept at millesimal resolution.
#[inline]
pub fn round3(v: f64) -> f64 {
    round_to(v, 3)
}

/// Worst-case duration in milliseconds of `polls` sleeps of `poll_us` each.
#[inline]
pub fn poll_budget_ms(polls: u32, poll_us: u64) -> u64 {
    u64::from(polls).saturating_mul(poll_us) / MICROS_PER_MILLI
}
