//! Queue that runs each job in the caller's task.

use crate::jobs::{
    domain::QueuedJob,
    ports::{JobHandler, JobQueue, JobQueueError, JobQueueResult},
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Runs jobs synchronously on submit; a handler error is returned to the
/// submitter.
#[derive(Debug)]
pub struct InlineJobQueue<H>
where
    H: JobHandler,
{
    handler: Arc<H>,
}

impl<H> InlineJobQueue<H>
where
    H: JobHandler,
{
    /// Creates a queue in front of `handler`.
    #[must_use]
    pub const fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<H> JobQueue for InlineJobQueue<H>
where
    H: JobHandler,
{
    async fn submit(&self, job: QueuedJob) -> JobQueueResult<()> {
        let run = self
            .handler
            .handle(job.request)
            .await
            .map_err(JobQueueError::handler)?;
        info!(
            job_key = %job.key,
            job_run_id = %run.id(),
            status = run.status().as_str(),
            "job finished inline"
        );
        Ok(())
    }
}
