//! Admission-bounded request queue for the generation capability.
//!
//! Bounds both how many requests are in flight at once and how closely
//! consecutive request starts may follow each other. Admission is FIFO;
//! completion order is not, so callers correlate results by an explicit
//! identifier (chunk index), never by queue position.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;

/// Concurrency- and rate-bounding admission queue.
///
/// One instance per pipeline run. The in-flight permit count and the
/// last-start timestamp are the only shared mutable state in the pipeline;
/// both are owned here and never exposed.
pub struct Throttler {
    permits: Arc<Semaphore>,
    last_start: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl Throttler {
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            last_start: Mutex::new(None),
            min_interval,
        }
    }

    /// Run `task` once admitted: when fewer than `max_concurrent` tasks are
    /// active and at least `min_interval` has passed since the last start.
    pub async fn submit<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        // Fair semaphore: waiters are admitted in arrival order.
        let _permit = match self.permits.acquire().await {
            Ok(permit) => Some(permit),
            // The semaphore is never closed; if it ever were, running the
            // task unthrottled beats deadlocking the pipeline.
            Err(_) => None,
        };

        // Holding the pacing lock through the sleep serializes starts, so
        // two admitted tasks can never begin inside one interval.
        {
            let mut last = self.last_start.lock().await;
            if let Some(prev) = *last {
                let since = prev.elapsed();
                if since < self.min_interval {
                    tokio::time::sleep(self.min_interval - since).await;
                }
            }
            *last = Some(Instant::now());
        }

        task.await
    }
}
