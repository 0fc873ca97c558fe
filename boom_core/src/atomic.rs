//! Cooperative cancellation handle shared between threads.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "keep running" flag.
///
/// Clones observe the same flag. Loops poll `is_set()` once per iteration; clearing it
/// never interrupts work already in progress.
#[derive(Debug, Clone, Default)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    /// A lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// A flag that starts raised.
    pub fn raised() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
