//! Single-slot retry timer.
//!
//! Holds at most one pending task. Scheduling aborts whatever was pending,
//! so a loop can never have two overlapping retries. A task that fires
//! removes itself from the slot before it runs, which lets it reschedule
//! (or cancel) the slot without aborting itself.
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::util::lock;

#[derive(Debug)]
struct Pending {
    id: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
pub struct RetryTimer {
    slot: Arc<Mutex<Option<Pending>>>,
    seq: AtomicU64,
}

impl RetryTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`, replacing any pending task. Returns the deadline.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> Instant
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + delay;
        let slot = Arc::clone(&self.slot);

        let mut pending = lock(&self.slot);
        if let Some(prev) = pending.take() {
            prev.handle.abort();
            tracing::trace!(id = prev.id, "replaced pending retry");
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            {
                let mut current = lock(&slot);
                if current.as_ref().is_some_and(|p| p.id == id) {
                    *current = None;
                }
            }
            task.await;
        });
        *pending = Some(Pending {
            id,
            deadline,
            handle,
        });
        deadline
    }

    /// Abort the pending task, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match lock(&self.slot).take() {
            Some(p) => {
                p.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Deadline of the pending task.
    pub fn deadline(&self) -> Option<Instant> {
        lock(&self.slot).as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.slot).is_some()
    }
}

impl Drop for RetryTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
