use std::thread;
use std::time::Duration;

/// Pacing source for the sampler and the control loop.
///
/// Everything in the workspace waits through `sleep`, so tests can swap in a clock
/// that only counts.
pub trait Clock {
    fn sleep(&self, d: Duration);
}

/// Wall-clock pacing via `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            thread::sleep(d);
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Counts requested sleeps instead of blocking. Clones share the total.
    #[derive(Debug, Clone, Default)]
    pub struct TestClock {
        slept: Arc<Mutex<Duration>>,
    }

    impl TestClock {
        pub fn new() -> Self {
            Self::default()
        }

        /// Total time the clock has been asked to sleep.
        pub fn elapsed(&self) -> Duration {
            self.slept.lock().map(|g| *g).unwrap_or(Duration::ZERO)
        }
    }

    impl Clock for TestClock {
        fn sleep(&self, d: Duration) {
            if let Ok(mut slept) = self.slept.lock() {
                *slept = slept.saturating_add(d);
            }
        }
    }

}
