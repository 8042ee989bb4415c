//! Idempotent enqueueing of job requests.

use crate::jobs::{
    domain::{EnqueueOutcome, JobKey, JobRequest, QueuedJob},
    ports::{JobQueue, JobQueueResult},
};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Dedupe window used when none is configured.
pub const DEFAULT_DEDUPE_WINDOW_SECS: u64 = 60;

/// Dispatches each logical job at most once per dedupe window.
///
/// Keys from older windows are forgotten as time moves on, so the set of
/// remembered keys stays bounded by the number of distinct requests per
/// window.
pub struct JobScheduler<Q, C>
where
    Q: JobQueue + ?Sized,
    C: Clock + Send + Sync,
{
    queue: Arc<Q>,
    clock: Arc<C>,
    window_secs: u64,
    seen: Mutex<HashMap<JobKey, i64>>,
}

impl<Q, C> JobScheduler<Q, C>
where
    Q: JobQueue + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a scheduler with the default dedupe window.
    #[must_use]
    pub fn new(queue: Arc<Q>, clock: Arc<C>) -> Self {
        Self {
            queue,
            clock,
            window_secs: DEFAULT_DEDUPE_WINDOW_SECS,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the dedupe window in seconds.
    #[must_use]
    pub const fn with_window_secs(mut self, window_secs: u64) -> Self {
        self.window_secs = window_secs;
        self
    }

    /// Enqueues `request` unless the same key was already accepted in the
    /// current window.
    ///
    /// # Errors
    ///
    /// Returns the queue error when the job cannot be handed over. The key
    /// is released so a later attempt in the same window can retry.
    pub async fn enqueue(&self, request: JobRequest) -> JobQueueResult<EnqueueOutcome> {
        let now = self.clock.utc();
        let bucket = JobKey::bucket(now, self.window_secs);
        let key = JobKey::derive(&request, now, self.window_secs);
        if !self.claim(&key, bucket) {
            debug!(job_key = %key, "duplicate job request ignored");
            return Ok(EnqueueOutcome::Duplicate(key));
        }

        let job = QueuedJob {
            key: key.clone(),
            request,
        };
        if let Err(err) = self.queue.submit(job).await {
            self.release(&key);
            return Err(err);
        }
        debug!(job_key = %key, kind = %request.kind, "job enqueued");
        Ok(EnqueueOutcome::Accepted(key))
    }

    fn claim(&self, key: &JobKey, bucket: i64) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.retain(|_, seen_bucket| *seen_bucket >= bucket);
        if seen.contains_key(key) {
            return false;
        }
        seen.insert(key.clone(), bucket);
        true
    }

    fn release(&self, key: &JobKey) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
