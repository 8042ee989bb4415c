//! Repository ports for workflow and job run records.

use crate::ids::{JobRunId, OrgId, WorkflowRunId};
use crate::ledger::domain::{JobRun, WorkflowRun};
use crate::storage::PersistenceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for ledger repository operations.
pub type LedgerResult<T> = Result<T, LedgerStoreError>;

/// Workflow run persistence contract.
#[async_trait]
pub trait WorkflowRunRepository: Send + Sync {
    /// Stores a new run.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::UnknownOrganization`] when the run names an
    /// organization that does not exist.
    async fn create(&self, run: &WorkflowRun) -> LedgerResult<()>;

    /// Persists the terminal state of a run that is still stored as running.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::WorkflowRunNotRunning`] when the stored
    /// run is missing or already finished.
    async fn finish(&self, run: &WorkflowRun) -> LedgerResult<()>;

    /// Finds a run by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] when the read fails.
    async fn find_by_id(&self, id: WorkflowRunId) -> LedgerResult<Option<WorkflowRun>>;

    /// Lists runs newest first, optionally for one organization.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] when the read fails.
    async fn list_recent(
        &self,
        org_id: Option<OrgId>,
        limit: usize,
    ) -> LedgerResult<Vec<WorkflowRun>>;

    /// Lists runs still running that started before `cutoff`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] when the read fails.
    async fn list_stale(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> LedgerResult<Vec<WorkflowRun>>;
}

/// Job run persistence contract.
#[async_trait]
pub trait JobRunRepository: Send + Sync {
    /// Stores a new run.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::UnknownOrganization`] when the run names an
    /// organization that does not exist.
    async fn create(&self, run: &JobRun) -> LedgerResult<()>;

    /// Persists the terminal state of a run that is still stored as running.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::JobRunNotRunning`] when the stored run is
    /// missing or already finished.
    async fn finish(&self, run: &JobRun) -> LedgerResult<()>;

    /// Finds a run by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] when the read fails.
    async fn find_by_id(&self, id: JobRunId) -> LedgerResult<Option<JobRun>>;

    /// Lists runs newest first, optionally for one organization.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] when the read fails.
    async fn list_recent(&self, org_id: Option<OrgId>, limit: usize) -> LedgerResult<Vec<JobRun>>;

    /// Lists runs still running that started before `cutoff`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] when the read fails.
    async fn list_stale(&self, cutoff: DateTime<Utc>, limit: usize) -> LedgerResult<Vec<JobRun>>;
}

/// Errors returned by ledger repository implementations.
#[derive(Debug, Clone, Error)]
pub enum LedgerStoreError {
    /// The organization does not exist.
    #[error("unknown organization: {0}")]
    UnknownOrganization(OrgId),

    /// The workflow run is missing or no longer running.
    #[error("workflow run {0} is not running")]
    WorkflowRunNotRunning(WorkflowRunId),

    /// The job run is missing or no longer running.
    #[error("job run {0} is not running")]
    JobRunNotRunning(JobRunId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LedgerStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceError for LedgerStoreError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}
