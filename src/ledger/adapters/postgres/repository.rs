//! `PostgreSQL` repository implementations for run records.

use super::models::{JobRunRow, WorkflowRunRow};
use crate::ids::{JobRunId, OrgId, WorkflowRunId};
use crate::ledger::{
    domain::{JobRun, JobRunStatus, WorkflowRun, WorkflowRunStatus},
    ports::{JobRunRepository, LedgerResult, LedgerStoreError, WorkflowRunRepository},
};
use crate::storage::postgres::schema::{job_runs, workflow_runs};
use crate::storage::postgres::{PgPool, is_foreign_key_violation, run_blocking, to_row_limit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;

fn map_create_error(org_id: Option<OrgId>) -> impl FnOnce(DieselError) -> LedgerStoreError {
    move |err| match org_id {
        Some(id) if is_foreign_key_violation(&err) => LedgerStoreError::UnknownOrganization(id),
        _ => LedgerStoreError::persistence(err),
    }
}

/// `PostgreSQL`-backed workflow run repository.
#[derive(Debug, Clone)]
pub struct PostgresWorkflowRunRepository {
    pool: PgPool,
}

impl PostgresWorkflowRunRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowRunRepository for PostgresWorkflowRunRepository {
    async fn create(&self, run: &WorkflowRun) -> LedgerResult<()> {
        let org_id = run.org_id();
        let row = WorkflowRunRow::from_run(run);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(workflow_runs::table)
                .values(&row)
                .execute(connection)
                .map_err(map_create_error(org_id))?;
            Ok(())
        })
        .await
    }

    async fn finish(&self, run: &WorkflowRun) -> LedgerResult<()> {
        let run_id = run.id();
        let row = WorkflowRunRow::from_run(run);
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(
                workflow_runs::table
                    .filter(workflow_runs::id.eq(row.id))
                    .filter(workflow_runs::status.eq(WorkflowRunStatus::Running.as_str())),
            )
            .set((
                workflow_runs::status.eq(&row.status),
                workflow_runs::summary.eq(&row.summary),
                workflow_runs::finished_at.eq(row.finished_at),
            ))
            .execute(connection)
            .map_err(LedgerStoreError::persistence)?;
            if updated == 0 {
                return Err(LedgerStoreError::WorkflowRunNotRunning(run_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: WorkflowRunId) -> LedgerResult<Option<WorkflowRun>> {
        run_blocking(&self.pool, move |connection| {
            workflow_runs::table
                .find(id.into_inner())
                .select(WorkflowRunRow::as_select())
                .first::<WorkflowRunRow>(connection)
                .optional()
                .map_err(LedgerStoreError::persistence)?
                .map(WorkflowRunRow::into_run)
                .transpose()
        })
        .await
    }

    async fn list_recent(
        &self,
        org_id: Option<OrgId>,
        limit: usize,
    ) -> LedgerResult<Vec<WorkflowRun>> {
        let row_limit = to_row_limit::<LedgerStoreError>(limit)?;
        run_blocking(&self.pool, move |connection| {
            let mut query = workflow_runs::table
                .order((workflow_runs::started_at.desc(), workflow_runs::id.asc()))
                .limit(row_limit)
                .select(WorkflowRunRow::as_select())
                .into_boxed();
            if let Some(org) = org_id {
                query = query.filter(workflow_runs::org_id.eq(org.into_inner()));
            }
            query
                .load::<WorkflowRunRow>(connection)
                .map_err(LedgerStoreError::persistence)?
                .into_iter()
                .map(WorkflowRunRow::into_run)
                .collect()
        })
        .await
    }

    async fn list_stale(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> LedgerResult<Vec<WorkflowRun>> {
        let row_limit = to_row_limit::<LedgerStoreError>(limit)?;
        run_blocking(&self.pool, move |connection| {
            workflow_runs::table
                .filter(workflow_runs::status.eq(WorkflowRunStatus::Running.as_str()))
                .filter(workflow_runs::started_at.lt(cutoff))
                .order((workflow_runs::started_at.asc(), workflow_runs::id.asc()))
                .limit(row_limit)
                .select(WorkflowRunRow::as_select())
                .load::<WorkflowRunRow>(connection)
                .map_err(LedgerStoreError::persistence)?
                .into_iter()
                .map(WorkflowRunRow::into_run)
                .collect()
        })
        .await
    }
}

/// `PostgreSQL`-backed job run repository.
#[derive(Debug, Clone)]
pub struct PostgresJobRunRepository {
    pool: PgPool,
}

impl PostgresJobRunRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobRunRepository for PostgresJobRunRepository {
    async fn create(&self, run: &JobRun) -> LedgerResult<()> {
        let org_id = run.org_id();
        let row = JobRunRow::from_run(run);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(job_runs::table)
                .values(&row)
                .execute(connection)
                .map_err(map_create_error(org_id))?;
            Ok(())
        })
        .await
    }

    async fn finish(&self, run: &JobRun) -> LedgerResult<()> {
        let run_id = run.id();
        let row = JobRunRow::from_run(run);
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(
                job_runs::table
                    .filter(job_runs::id.eq(row.id))
                    .filter(job_runs::status.eq(JobRunStatus::Running.as_str())),
            )
            .set((
                job_runs::status.eq(&row.status),
                job_runs::message.eq(&row.message),
                job_runs::result.eq(&row.result),
                job_runs::finished_at.eq(row.finished_at),
            ))
            .execute(connection)
            .map_err(LedgerStoreError::persistence)?;
            if updated == 0 {
                return Err(LedgerStoreError::JobRunNotRunning(run_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: JobRunId) -> LedgerResult<Option<JobRun>> {
        run_blocking(&self.pool, move |connection| {
            job_runs::table
                .find(id.into_inner())
                .select(JobRunRow::as_select())
                .first::<JobRunRow>(connection)
                .optional()
                .map_err(LedgerStoreError::persistence)?
                .map(JobRunRow::into_run)
                .transpose()
        })
        .await
    }

    async fn list_recent(&self, org_id: Option<OrgId>, limit: usize) -> LedgerResult<Vec<JobRun>> {
        let row_limit = to_row_limit::<LedgerStoreError>(limit)?;
        run_blocking(&self.pool, move |connection| {
            let mut query = job_runs::table
                .order((job_runs::started_at.desc(), job_runs::id.asc()))
                .limit(row_limit)
                .select(JobRunRow::as_select())
                .into_boxed();
            if let Some(org) = org_id {
                query = query.filter(job_runs::org_id.eq(org.into_inner()));
            }
            query
                .load::<JobRunRow>(connection)
                .map_err(LedgerStoreError::persistence)?
                .into_iter()
                .map(JobRunRow::into_run)
                .collect()
        })
        .await
    }

    async fn list_stale(&self, cutoff: DateTime<Utc>, limit: usize) -> LedgerResult<Vec<JobRun>> {
        let row_limit = to_row_limit::<LedgerStoreError>(limit)?;
        run_blocking(&self.pool, move |connection| {
            job_runs::table
                .filter(job_runs::status.eq(JobRunStatus::Running.as_str()))
                .filter(job_runs::started_at.lt(cutoff))
                .order((job_runs::started_at.asc(), job_runs::id.asc()))
                .limit(row_limit)
                .select(JobRunRow::as_select())
                .load::<JobRunRow>(connection)
                .map_err(LedgerStoreError::persistence)?
                .into_iter()
                .map(JobRunRow::into_run)
                .collect()
        })
        .await
    }
}
