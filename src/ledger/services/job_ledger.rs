//! Records the lifecycle of background jobs.

use crate::directory::ports::{DirectoryRepository, DirectoryRepositoryError};
use crate::ids::{JobRunId, OrgId};
use crate::ledger::{
    domain::{JobOutcome, JobRun, LedgerDomainError},
    ports::{JobRunRepository, LedgerStoreError},
};
use chrono::TimeDelta;
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Request to open a job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartJobRun {
    /// Organization the job works on, if any.
    pub org_id: Option<OrgId>,
    /// Job type such as `workflows.run`.
    pub job_type: String,
    /// Initial status message.
    pub message: Option<String>,
}

/// Request to record a job's terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteJobRun {
    /// Run to complete.
    pub id: JobRunId,
    /// Terminal status.
    pub outcome: JobOutcome,
    /// Final message; `None` keeps the current one.
    pub message: Option<String>,
    /// Result payload.
    pub result: Option<Value>,
}

/// Service-level errors for the job-run ledger.
#[derive(Debug, Error)]
pub enum LedgerServiceError {
    /// Lifecycle rule violated.
    #[error(transparent)]
    Domain(#[from] LedgerDomainError),
    /// Run repository operation failed.
    #[error(transparent)]
    Repository(#[from] LedgerStoreError),
    /// Organization lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryRepositoryError),
    /// The run does not exist.
    #[error("job run not found: {0}")]
    NotFound(JobRunId),
}

/// Result type for ledger operations.
pub type LedgerServiceResult<T> = Result<T, LedgerServiceError>;

/// Opens, completes, and fails job runs.
///
/// A run is stored before the job does any work and accepts exactly one
/// terminal update.
#[derive(Clone)]
pub struct JobRunLedger<J, D, C>
where
    J: JobRunRepository + ?Sized,
    D: DirectoryRepository + ?Sized,
    C: Clock + Send + Sync,
{
    runs: Arc<J>,
    directory: Arc<D>,
    clock: Arc<C>,
}

impl<J, D, C> JobRunLedger<J, D, C>
where
    J: JobRunRepository + ?Sized,
    D: DirectoryRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a ledger.
    #[must_use]
    pub const fn new(runs: Arc<J>, directory: Arc<D>, clock: Arc<C>) -> Self {
        Self {
            runs,
            directory,
            clock,
        }
    }

    /// Stores a running job run.
    ///
    /// The organization is recorded only when it exists, so a job naming a
    /// deleted organization still gets a ledger entry.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerServiceError`] when the lookup or insert fails.
    pub async fn start_run(&self, request: StartJobRun) -> LedgerServiceResult<JobRun> {
        let org_id = match request.org_id {
            Some(id) => self
                .directory
                .find_organization(id)
                .await?
                .map(|org| org.id()),
            None => None,
        };
        let run = JobRun::start(org_id, request.job_type, request.message, &*self.clock);
        self.runs.create(&run).await?;
        Ok(run)
    }

    /// Records the terminal outcome of a running job.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerServiceError::NotFound`] for an unknown run and
    /// [`LedgerServiceError::Domain`] when the run already finished.
    pub async fn complete_run(&self, request: CompleteJobRun) -> LedgerServiceResult<JobRun> {
        let mut run = self.load(request.id).await?;
        run.complete(request.outcome, request.message, request.result, &*self.clock)?;
        self.runs.finish(&run).await?;
        Ok(run)
    }

    /// Marks a running job as failed with `error` as message and result.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerServiceError::NotFound`] for an unknown run and
    /// [`LedgerServiceError::Domain`] when the run already finished.
    pub async fn fail_run(&self, id: JobRunId, error: &str) -> LedgerServiceResult<JobRun> {
        let mut run = self.load(id).await?;
        run.fail(error, &*self.clock)?;
        self.runs.finish(&run).await?;
        Ok(run)
    }

    /// Lists runs that have been running for longer than `older_than`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerServiceError::Repository`] when the read fails.
    pub async fn stale_runs(
        &self,
        older_than: TimeDelta,
        limit: usize,
    ) -> LedgerServiceResult<Vec<JobRun>> {
        let cutoff = self.clock.utc() - older_than;
        Ok(self.runs.list_stale(cutoff, limit).await?)
    }

    async fn load(&self, id: JobRunId) -> LedgerServiceResult<JobRun> {
        self.runs
            .find_by_id(id)
            .await?
            .ok_or(LedgerServiceError::NotFound(id))
    }
}
