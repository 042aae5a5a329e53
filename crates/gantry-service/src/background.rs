//! Detached background tasks for best-effort cache maintenance.

use crate::metrics;
use gantry_core::GantryResult;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Spawns detached tasks and tracks how many are still running.
///
/// A spawned task never reports back to the caller: failures are logged and
/// counted, then dropped. Dropping the caller's future does not cancel it.
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    in_flight: AtomicUsize,
    idle: Notify,
}

struct InFlightGuard(Arc<Inner>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

impl BackgroundTasks {
    /// Creates an empty task tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` on the Tokio runtime.
    pub fn spawn<F>(&self, name: &'static str, task: F)
    where
        F: Future<Output = GantryResult<()>> + Send + 'static,
    {
        self.inner.in_flight.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard(self.inner.clone());
        metrics::task_spawned(name);

        tokio::spawn(async move {
            let _guard = guard;
            match task.await {
                Ok(()) => debug!(task = name, "Background task completed"),
                Err(e) => {
                    metrics::task_failed(name);
                    warn!(task = name, error = %e, "Background task failed");
                }
            }
        });
    }

    /// Number of tasks that have not finished yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Waits until no task is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Waits until no task is running, giving up after `timeout`.
    ///
    /// Returns `true` if every task finished in time.
    pub async fn drain(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_idle()).await.is_ok()
    }
}

impl std::fmt::Debug for BackgroundTasks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundTasks")
            .field("in_flight", &self.in_flight())
            .finish()
    }
}
