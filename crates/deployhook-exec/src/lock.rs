//! Process-wide serialization of action runs.

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// At most one action run holds this at a time; waiters queue in FIFO order.
///
/// Deployments share project directories on disk, so runs never interleave
/// even though each carries its own working directory.
#[derive(Debug, Clone, Default)]
pub struct ExecutionLock {
    inner: Arc<Mutex<()>>,
}

/// Held for the duration of one action run.
#[derive(Debug)]
pub struct ExecutionGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ExecutionLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self) -> ExecutionGuard {
        let guard = self.inner.clone().lock_owned().await;
        ExecutionGuard { _guard: guard }
    }

    /// Whether a run is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}
