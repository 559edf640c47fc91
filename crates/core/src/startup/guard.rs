//! One-time startup latch.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, MutexGuard};

/// Latch ensuring the startup body runs at most once.
///
/// Entering holds an async mutex for the whole run, so a concurrent caller
/// waits for the first run to finish and then observes the latch set.
#[derive(Debug, Default)]
pub struct StartupGuard {
    gate: Mutex<()>,
    started: AtomicBool,
}

/// Exclusive permission to run the startup body.
///
/// Dropping it without [`GuardPass::complete`] leaves the latch unset.
#[must_use = "the latch is only set by GuardPass::complete"]
pub struct GuardPass<'a> {
    _gate: MutexGuard<'a, ()>,
    started: &'a AtomicBool,
}

impl StartupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access; `None` once the latch is set.
    pub async fn enter(&self) -> Option<GuardPass<'_>> {
        let gate = self.gate.lock().await;
        if self.started.load(Ordering::Acquire) {
            return None;
        }
        Some(GuardPass { _gate: gate, started: &self.started })
    }

    pub fn is_set(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

impl GuardPass<'_> {
    /// Set the latch. It is never cleared afterwards.
    pub fn complete(self) {
        self.started.store(true, Ordering::Release);
    }
}
