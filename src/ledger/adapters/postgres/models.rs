//! Diesel row models for run records.

use crate::ids::{JobRunId, OrgId, UserId, WorkflowRunId};
use crate::ledger::{
    domain::{
        JobRun, JobRunStatus, PersistedJobRunData, PersistedWorkflowRunData, WorkflowRun,
        WorkflowRunStatus, WorkflowRunType,
    },
    ports::{LedgerResult, LedgerStoreError},
};
use crate::storage::postgres::schema::{job_runs, workflow_runs};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query and insert row for workflow runs.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = workflow_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct WorkflowRunRow {
    /// Run identifier.
    pub id: uuid::Uuid,
    /// Organization.
    pub org_id: Option<uuid::Uuid>,
    /// Run type.
    pub run_type: String,
    /// Lifecycle status.
    pub status: String,
    /// Summary payload.
    pub summary: Option<Value>,
    /// Triggering user.
    pub triggered_by: Option<uuid::Uuid>,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Finish timestamp.
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowRunRow {
    /// Builds a row from a domain run.
    #[must_use]
    pub fn from_run(run: &WorkflowRun) -> Self {
        Self {
            id: run.id().into_inner(),
            org_id: run.org_id().map(OrgId::into_inner),
            run_type: run.run_type().as_str().to_owned(),
            status: run.status().as_str().to_owned(),
            summary: run.summary().cloned(),
            triggered_by: run.triggered_by().map(UserId::into_inner),
            started_at: run.started_at(),
            finished_at: run.finished_at(),
        }
    }

    /// Converts the row into a domain run.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] for unknown type or status
    /// values.
    pub fn into_run(self) -> LedgerResult<WorkflowRun> {
        let run_type = WorkflowRunType::try_from(self.run_type.as_str())
            .map_err(LedgerStoreError::persistence)?;
        let status = WorkflowRunStatus::try_from(self.status.as_str())
            .map_err(LedgerStoreError::persistence)?;
        Ok(WorkflowRun::from_persisted(PersistedWorkflowRunData {
            id: WorkflowRunId::from_uuid(self.id),
            org_id: self.org_id.map(OrgId::from_uuid),
            run_type,
            status,
            summary: self.summary,
            triggered_by: self.triggered_by.map(UserId::from_uuid),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }))
    }
}

/// Query and insert row for job runs.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = job_runs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRunRow {
    /// Run identifier.
    pub id: uuid::Uuid,
    /// Organization.
    pub org_id: Option<uuid::Uuid>,
    /// Job type.
    pub job_type: String,
    /// Lifecycle status.
    pub status: String,
    /// Status message.
    pub message: Option<String>,
    /// Result payload.
    pub result: Option<Value>,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Finish timestamp.
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRunRow {
    /// Builds a row from a domain run.
    #[must_use]
    pub fn from_run(run: &JobRun) -> Self {
        Self {
            id: run.id().into_inner(),
            org_id: run.org_id().map(OrgId::into_inner),
            job_type: run.job_type().to_owned(),
            status: run.status().as_str().to_owned(),
            message: run.message().map(str::to_owned),
            result: run.result().cloned(),
            started_at: run.started_at(),
            finished_at: run.finished_at(),
        }
    }

    /// Converts the row into a domain run.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerStoreError::Persistence`] for an unknown status.
    pub fn into_run(self) -> LedgerResult<JobRun> {
        let status =
            JobRunStatus::try_from(self.status.as_str()).map_err(LedgerStoreError::persistence)?;
        Ok(JobRun::from_persisted(PersistedJobRunData {
            id: JobRunId::from_uuid(self.id),
            org_id: self.org_id.map(OrgId::from_uuid),
            job_type: self.job_type,
            status,
            message: self.message,
            result: self.result,
            started_at: self.started_at,
            finished_at: self.finished_at,
        }))
    }
}
