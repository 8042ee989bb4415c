//! Workflow run records.

use super::{LedgerDomainError, ParseRunValueError};
use crate::ids::{OrgId, UserId, WorkflowRunId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a workflow run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRunType {
    /// Started for one organization on request.
    Manual,
    /// Started by the scheduler.
    Scheduled,
}

impl WorkflowRunType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
        }
    }
}

impl TryFrom<&str> for WorkflowRunType {
    type Error = ParseRunValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "scheduled" => Ok(Self::Scheduled),
            _ => Err(ParseRunValueError(value.to_owned())),
        }
    }
}

/// Lifecycle status of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowRunStatus {
    /// Work in progress.
    Running,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Failed,
}

impl WorkflowRunStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for WorkflowRunStatus {
    type Error = ParseRunValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseRunValueError(value.to_owned())),
        }
    }
}

/// Record of one orchestrator pass over an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    id: WorkflowRunId,
    org_id: Option<OrgId>,
    run_type: WorkflowRunType,
    status: WorkflowRunStatus,
    summary: Option<Value>,
    triggered_by: Option<UserId>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedWorkflowRunData {
    /// Persisted identifier.
    pub id: WorkflowRunId,
    /// Organization, if known.
    pub org_id: Option<OrgId>,
    /// Run type.
    pub run_type: WorkflowRunType,
    /// Lifecycle status.
    pub status: WorkflowRunStatus,
    /// Summary payload.
    pub summary: Option<Value>,
    /// Triggering user.
    pub triggered_by: Option<UserId>,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Finish timestamp.
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// Starts a run in the `Running` status.
    #[must_use]
    pub fn start(
        org_id: Option<OrgId>,
        run_type: WorkflowRunType,
        triggered_by: Option<UserId>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: WorkflowRunId::new(),
            org_id,
            run_type,
            status: WorkflowRunStatus::Running,
            summary: None,
            triggered_by,
            started_at: clock.utc(),
            finished_at: None,
        }
    }

    /// Reconstructs a run from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedWorkflowRunData) -> Self {
        Self {
            id: data.id,
            org_id: data.org_id,
            run_type: data.run_type,
            status: data.status,
            summary: data.summary,
            triggered_by: data.triggered_by,
            started_at: data.started_at,
            finished_at: data.finished_at,
        }
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn id(&self) -> WorkflowRunId {
        self.id
    }

    /// Returns the organization.
    #[must_use]
    pub const fn org_id(&self) -> Option<OrgId> {
        self.org_id
    }

    /// Returns the run type.
    #[must_use]
    pub const fn run_type(&self) -> WorkflowRunType {
        self.run_type
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> WorkflowRunStatus {
        self.status
    }

    /// Returns the summary payload.
    #[must_use]
    pub const fn summary(&self) -> Option<&Value> {
        self.summary.as_ref()
    }

    /// Returns the triggering user.
    #[must_use]
    pub const fn triggered_by(&self) -> Option<UserId> {
        self.triggered_by
    }

    /// Returns the start timestamp.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the finish timestamp.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Finishes the run successfully.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerDomainError::WorkflowRunFinished`] when the run is no
    /// longer running.
    pub fn complete(
        &mut self,
        summary: Value,
        clock: &impl Clock,
    ) -> Result<(), LedgerDomainError> {
        self.finish(WorkflowRunStatus::Completed, summary, clock)
    }

    /// Finishes the run as failed, keeping the partial summary.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerDomainError::WorkflowRunFinished`] when the run is no
    /// longer running.
    pub fn fail(&mut self, summary: Value, clock: &impl Clock) -> Result<(), LedgerDomainError> {
        self.finish(WorkflowRunStatus::Failed, summary, clock)
    }

    fn finish(
        &mut self,
        status: WorkflowRunStatus,
        summary: Value,
        clock: &impl Clock,
    ) -> Result<(), LedgerDomainError> {
        if self.status != WorkflowRunStatus::Running {
            return Err(LedgerDomainError::WorkflowRunFinished(self.id));
        }
        self.status = status;
        self.summary = Some(summary);
        self.finished_at = Some(clock.utc());
        Ok(())
    }
}
