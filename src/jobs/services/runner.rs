//! Executes job requests and records them in the job-run ledger.

use crate::config::AutomationConfig;
use crate::directory::ports::DirectoryRepository;
use crate::jobs::{
    domain::{JobKind, JobRequest},
    ports::JobHandler,
};
use crate::ledger::{
    domain::{JobOutcome, JobRun},
    ports::JobRunRepository,
    services::{CompleteJobRun, JobRunLedger, LedgerServiceError, StartJobRun},
};
use crate::notification::{
    ports::{EmailOutbox, NotificationStoreError},
    services::EmailFlushService,
};
use crate::workflow::{
    domain::{RunStatus, WorkflowBatchResult},
    services::{SlaScanService, WorkflowError, WorkflowOrchestrator, WorkflowPorts},
};
use async_trait::async_trait;
use mockable::Clock;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Emails sent per flush unless configured otherwise.
const DEFAULT_FLUSH_LIMIT: usize = 100;

/// Errors raised while running a job.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job-run ledger could not record the run.
    #[error(transparent)]
    Ledger(#[from] LedgerServiceError),
    /// A workflow or SLA scan could not start.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    /// The email outbox failed.
    #[error(transparent)]
    Notifications(#[from] NotificationStoreError),
}

/// Result type for job execution.
pub type JobRunnerResult<T> = Result<T, JobError>;

/// What a finished job reports to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Terminal status.
    pub outcome: JobOutcome,
    /// Final ledger message.
    pub message: String,
    /// Result payload.
    pub result: Value,
}

impl JobReport {
    fn from_batch(batch: &WorkflowBatchResult) -> Self {
        let (outcome, message) = if batch.all_succeeded() {
            (
                JobOutcome::Success,
                format!("Workflow run completed for {} org(s)", batch.results.len()),
            )
        } else {
            (
                JobOutcome::Failed,
                format!("Workflow run finished with {} failed org(s)", batch.failed_orgs),
            )
        };
        Self {
            outcome,
            message,
            result: batch.summary(),
        }
    }
}

type DynLedger<C> = JobRunLedger<dyn JobRunRepository, dyn DirectoryRepository, C>;

/// Runs `sla.scan`, `workflows.run`, and `notifications.flush` jobs.
///
/// Every job gets a ledger entry before any work starts. A job whose
/// organizations partly failed finishes as failed; a job that could not
/// run at all is failed with the error message.
pub struct JobRunner<C>
where
    C: Clock + Send + Sync,
{
    ledger: DynLedger<C>,
    orchestrator: WorkflowOrchestrator<C>,
    sla_scan: SlaScanService<C>,
    flush: EmailFlushService<dyn EmailOutbox, C>,
    flush_limit: usize,
}

impl<C> JobRunner<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a runner over the ledger and the job services.
    #[must_use]
    pub const fn new(
        ledger: DynLedger<C>,
        orchestrator: WorkflowOrchestrator<C>,
        sla_scan: SlaScanService<C>,
        flush: EmailFlushService<dyn EmailOutbox, C>,
    ) -> Self {
        Self {
            ledger,
            orchestrator,
            sla_scan,
            flush,
            flush_limit: DEFAULT_FLUSH_LIMIT,
        }
    }

    /// Wires a runner from the workflow ports, applying the configured
    /// scan and flush limits.
    #[must_use]
    pub fn from_ports(
        ports: WorkflowPorts,
        job_runs: Arc<dyn JobRunRepository>,
        outbox: Arc<dyn EmailOutbox>,
        clock: &Arc<C>,
        limits: AutomationConfig,
    ) -> Self {
        let sla_scan = SlaScanService::new(
            Arc::clone(&ports.directory),
            Arc::clone(&ports.tickets),
            Arc::clone(&ports.notifications),
            Arc::clone(&ports.audit),
            Arc::clone(clock),
        )
        .with_scan_limit(limits.sla_scan_limit);
        let ledger = JobRunLedger::new(job_runs, Arc::clone(&ports.directory), Arc::clone(clock));
        let orchestrator = WorkflowOrchestrator::new(ports, Arc::clone(clock))
            .with_scan_limit(limits.workflow_scan_limit);
        let flush = EmailFlushService::new(outbox, Arc::clone(clock));
        Self::new(ledger, orchestrator, sla_scan, flush)
            .with_flush_limit(limits.notification_flush_limit)
    }

    /// Sets the number of emails sent per flush.
    #[must_use]
    pub const fn with_flush_limit(mut self, flush_limit: usize) -> Self {
        self.flush_limit = flush_limit;
        self
    }

    /// Runs one job and returns its finished ledger record.
    ///
    /// # Errors
    ///
    /// Returns [`JobError::Ledger`] when the run cannot be started or its
    /// outcome cannot be recorded.
    pub async fn run(&self, request: JobRequest) -> JobRunnerResult<JobRun> {
        let run = self
            .ledger
            .start_run(StartJobRun {
                org_id: request.org_id,
                job_type: request.kind.as_str().to_owned(),
                message: Some(request.kind.start_message().to_owned()),
            })
            .await?;

        let dispatched = self.dispatch(request).await;
        let finished = match dispatched {
            Ok(report) => {
                self.ledger
                    .complete_run(CompleteJobRun {
                        id: run.id(),
                        outcome: report.outcome,
                        message: Some(report.message),
                        result: Some(report.result),
                    })
                    .await?
            }
            Err(err) => {
                warn!(job_run_id = %run.id(), kind = %request.kind, error = %err, "job failed");
                self.ledger.fail_run(run.id(), &err.to_string()).await?
            }
        };
        Ok(finished)
    }

    async fn dispatch(&self, request: JobRequest) -> JobRunnerResult<JobReport> {
        match request.kind {
            JobKind::SlaScan => self.run_sla_scan(request).await,
            JobKind::WorkflowsRun => self.run_workflows(request).await,
            JobKind::NotificationsFlush => self.run_flush(request).await,
        }
    }

    async fn run_sla_scan(&self, request: JobRequest) -> JobRunnerResult<JobReport> {
        let summaries = self
            .sla_scan
            .run_sla_scan(request.org_id, request.triggered_by)
            .await?;
        let failed = summaries
            .iter()
            .filter(|summary| summary.status == RunStatus::Failed)
            .count();
        let (outcome, message) = if failed == 0 {
            (
                JobOutcome::Success,
                format!("SLA scan completed for {} org(s)", summaries.len()),
            )
        } else {
            (
                JobOutcome::Failed,
                format!("SLA scan finished with {failed} failed org(s)"),
            )
        };
        let orgs: Vec<Value> = summaries.iter().map(|summary| summary.summary()).collect();
        Ok(JobReport {
            outcome,
            message,
            result: json!({ "orgs": orgs }),
        })
    }

    async fn run_workflows(&self, request: JobRequest) -> JobRunnerResult<JobReport> {
        let batch = match request.org_id {
            Some(org_id) => WorkflowBatchResult::from_results(vec![
                self.orchestrator
                    .run_for_org(org_id, request.triggered_by)
                    .await,
            ]),
            None => self.orchestrator.run_for_all_orgs(request.triggered_by).await?,
        };
        Ok(JobReport::from_batch(&batch))
    }

    async fn run_flush(&self, request: JobRequest) -> JobRunnerResult<JobReport> {
        let summary = self.flush.flush(request.org_id, self.flush_limit).await?;
        Ok(JobReport {
            outcome: JobOutcome::Success,
            message: format!("Flushed {} email(s)", summary.sent),
            result: json!({ "scanned": summary.scanned, "sent": summary.sent }),
        })
    }
}

#[async_trait]
impl<C> JobHandler for JobRunner<C>
where
    C: Clock + Send + Sync,
{
    type Error = JobError;

    async fn handle(&self, request: JobRequest) -> Result<JobRun, Self::Error> {
        self.run(request).await
    }
}
