//! Cooperative cancellation of long-running work.

use std::sync::atomic::{AtomicBool, Ordering};

/// A flag that long-running operations poll to find out they should stop.
///
/// Cancelling never interrupts anything; it asks work in progress to wrap up
/// with whatever coarser result it can still produce. Time limits are
/// implemented by cancelling from another thread.
#[derive(Debug, Default)]
pub struct Cancellation {
    cancelled: AtomicBool,
}

impl Cancellation {
    /// A signal that has not been raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Lower the signal again so it can be reused for the next operation.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
