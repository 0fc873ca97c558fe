//! Control loop lifecycle and per-iteration outcome.

/// Lifecycle of a `ControlLoop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting for the first nonzero x reading.
    Calibrating,
    /// Tracking acceleration and commanding the servo.
    Steady,
    /// Run flag cleared; no further commands are issued.
    Stopped,
}

/// Outcome of a single angle-computation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlStatus {
    /// |x| below tolerance; nothing was commanded.
    DeadBand,
    /// The servo was commanded from `from` to `to` (post-clamp) degrees.
    Moved { from: f64, to: f64 },
}
