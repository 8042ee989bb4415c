//! Queue backed by a tokio channel and a background worker.

use crate::jobs::{
    domain::QueuedJob,
    ports::{JobHandler, JobQueue, JobQueueError, JobQueueResult},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Sends jobs to a worker task that runs them one at a time.
///
/// Dropping every clone of the queue closes the channel; the worker drains
/// the jobs already sent and then exits.
#[derive(Debug, Clone)]
pub struct ChannelJobQueue {
    sender: mpsc::Sender<QueuedJob>,
}

impl ChannelJobQueue {
    /// Spawns the worker on the current runtime and returns the queue with
    /// the worker's join handle.
    #[must_use]
    pub fn spawn<H>(handler: Arc<H>, capacity: usize) -> (Self, JoinHandle<()>)
    where
        H: JobHandler + 'static,
    {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(handler, receiver));
        (Self { sender }, worker)
    }
}

#[async_trait]
impl JobQueue for ChannelJobQueue {
    async fn submit(&self, job: QueuedJob) -> JobQueueResult<()> {
        self.sender
            .send(job)
            .await
            .map_err(|_| JobQueueError::Closed)
    }
}

async fn run_worker<H>(handler: Arc<H>, mut receiver: mpsc::Receiver<QueuedJob>)
where
    H: JobHandler,
{
    while let Some(job) = receiver.recv().await {
        match handler.handle(job.request).await {
            Ok(run) => info!(
                job_key = %job.key,
                job_run_id = %run.id(),
                status = run.status().as_str(),
                "job finished"
            ),
            Err(err) => error!(job_key = %job.key, error = %err, "job could not be run"),
        }
    }
    info!("job worker stopped");
}
