//! Port contracts for job queues and handlers.

use crate::jobs::domain::{JobRequest, QueuedJob};
use crate::ledger::domain::JobRun;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for queue operations.
pub type JobQueueResult<T> = Result<T, JobQueueError>;

/// Delivers keyed jobs to a handler.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Hands `job` to the queue.
    ///
    /// # Errors
    ///
    /// Returns [`JobQueueError::Closed`] when the queue no longer accepts
    /// jobs, or [`JobQueueError::Handler`] when an inline handler fails.
    async fn submit(&self, job: QueuedJob) -> JobQueueResult<()>;
}

/// Executes job requests.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Error raised when a job cannot be run or recorded.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Runs one job and returns its ledger record.
    async fn handle(&self, request: JobRequest) -> Result<JobRun, Self::Error>;
}

/// Errors returned by job queues.
#[derive(Debug, Clone, Error)]
pub enum JobQueueError {
    /// The worker behind the queue has stopped.
    #[error("job queue is closed")]
    Closed,

    /// An inline handler failed.
    #[error("job handler failed: {0}")]
    Handler(Arc<dyn std::error::Error + Send + Sync>),
}

impl JobQueueError {
    /// Wraps a handler error.
    pub fn handler(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Handler(Arc::new(err))
    }
}
