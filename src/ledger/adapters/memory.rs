//! In-memory workflow and job run repositories.

use crate::ids::{JobRunId, OrgId, WorkflowRunId};
use crate::ledger::{
    domain::{JobRun, JobRunStatus, WorkflowRun, WorkflowRunStatus},
    ports::{JobRunRepository, LedgerResult, LedgerStoreError, WorkflowRunRepository},
};
use crate::storage::memory::{InMemoryDatabase, Tables, take_limit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;

fn ensure_organization(tables: &Tables, org_id: Option<OrgId>) -> LedgerResult<()> {
    match org_id {
        Some(id) if !tables.organizations.contains_key(&id) => {
            Err(LedgerStoreError::UnknownOrganization(id))
        }
        _ => Ok(()),
    }
}

/// Thread-safe in-memory workflow run repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkflowRunRepository {
    db: InMemoryDatabase,
}

impl InMemoryWorkflowRunRepository {
    /// Creates a repository over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WorkflowRunRepository for InMemoryWorkflowRunRepository {
    async fn create(&self, run: &WorkflowRun) -> LedgerResult<()> {
        let mut tables = self.db.write::<LedgerStoreError>()?;
        ensure_organization(&tables, run.org_id())?;
        tables.workflow_runs.insert(run.id(), run.clone());
        Ok(())
    }

    async fn finish(&self, run: &WorkflowRun) -> LedgerResult<()> {
        let mut tables = self.db.write::<LedgerStoreError>()?;
        let stored = tables
            .workflow_runs
            .get_mut(&run.id())
            .filter(|stored| stored.status() == WorkflowRunStatus::Running)
            .ok_or(LedgerStoreError::WorkflowRunNotRunning(run.id()))?;
        *stored = run.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: WorkflowRunId) -> LedgerResult<Option<WorkflowRun>> {
        let tables = self.db.read::<LedgerStoreError>()?;
        Ok(tables.workflow_runs.get(&id).cloned())
    }

    async fn list_recent(
        &self,
        org_id: Option<OrgId>,
        limit: usize,
    ) -> LedgerResult<Vec<WorkflowRun>> {
        let tables = self.db.read::<LedgerStoreError>()?;
        let mut runs: Vec<WorkflowRun> = tables
            .workflow_runs
            .values()
            .filter(|run| org_id.is_none_or(|org| run.org_id() == Some(org)))
            .cloned()
            .collect();
        runs.sort_by_key(|run| (Reverse(run.started_at()), run.id()));
        Ok(take_limit(runs, limit))
    }

    async fn list_stale(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> LedgerResult<Vec<WorkflowRun>> {
        let tables = self.db.read::<LedgerStoreError>()?;
        let mut runs: Vec<WorkflowRun> = tables
            .workflow_runs
            .values()
            .filter(|run| run.status() == WorkflowRunStatus::Running && run.started_at() < cutoff)
            .cloned()
            .collect();
        runs.sort_by_key(|run| (run.started_at(), run.id()));
        Ok(take_limit(runs, limit))
    }
}

/// Thread-safe in-memory job run repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobRunRepository {
    db: InMemoryDatabase,
}

impl InMemoryJobRunRepository {
    /// Creates a repository over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl JobRunRepository for InMemoryJobRunRepository {
    async fn create(&self, run: &JobRun) -> LedgerResult<()> {
        let mut tables = self.db.write::<LedgerStoreError>()?;
        ensure_organization(&tables, run.org_id())?;
        tables.job_runs.insert(run.id(), run.clone());
        Ok(())
    }

    async fn finish(&self, run: &JobRun) -> LedgerResult<()> {
        let mut tables = self.db.write::<LedgerStoreError>()?;
        let stored = tables
            .job_runs
            .get_mut(&run.id())
            .filter(|stored| stored.status() == JobRunStatus::Running)
            .ok_or(LedgerStoreError::JobRunNotRunning(run.id()))?;
        *stored = run.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: JobRunId) -> LedgerResult<Option<JobRun>> {
        let tables = self.db.read::<LedgerStoreError>()?;
        Ok(tables.job_runs.get(&id).cloned())
    }

    async fn list_recent(&self, org_id: Option<OrgId>, limit: usize) -> LedgerResult<Vec<JobRun>> {
        let tables = self.db.read::<LedgerStoreError>()?;
        let mut runs: Vec<JobRun> = tables
            .job_runs
            .values()
            .filter(|run| org_id.is_none_or(|org| run.org_id() == Some(org)))
            .cloned()
            .collect();
        runs.sort_by_key(|run| (Reverse(run.started_at()), run.id()));
        Ok(take_limit(runs, limit))
    }

    async fn list_stale(&self, cutoff: DateTime<Utc>, limit: usize) -> LedgerResult<Vec<JobRun>> {
        let tables = self.db.read::<LedgerStoreError>()?;
        let mut runs: Vec<JobRun> = tables
            .job_runs
            .values()
            .filter(|run| run.status() == JobRunStatus::Running && run.started_at() < cutoff)
            .cloned()
            .collect();
        runs.sort_by_key(|run| (run.started_at(), run.id()));
        Ok(take_limit(runs, limit))
    }
}
