//! Cooperative cancellation tokens.

use crate::core::traits::CancellationToken;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared abort flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag {
    flag: Arc<AtomicBool>,
}

impl AbortFlag {
    /// A flag that is not yet raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every holder of this flag to stop.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Lower the flag again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

impl CancellationToken for AbortFlag {
    fn poll_abort(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Token that never requests an abort.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverAbort;

impl CancellationToken for NeverAbort {
    fn poll_abort(&self) -> bool {
        false
    }
}
