//! Cooperative cancellation shared between the cycle loop and the input
//! watcher.
//!
//! One monotonic flag (false→true, never reset) is the only state the two
//! threads share; a single atomic suffices, no locking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag. Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    /// Creates a new, unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent; the flag never resets.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unset_and_stays_set() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
        flag.cancel();
        assert!(flag.is_cancelled());
        flag.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn clones_observe_the_same_flag() {
        let flag = CancelFlag::new();
        let observer = flag.clone();
        flag.cancel();
        assert!(observer.is_cancelled());
    }
}
