//! Job run records kept by the job-run ledger.

use super::{LedgerDomainError, ParseRunValueError};
use crate::ids::{JobRunId, OrgId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Lifecycle status of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobRunStatus {
    /// Work in progress.
    Running,
    /// Finished successfully.
    Success,
    /// Finished with an error.
    Failed,
}

impl JobRunStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for JobRunStatus {
    type Error = ParseRunValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseRunValueError(value.to_owned())),
        }
    }
}

/// Terminal status reported by a finished job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobOutcome {
    /// The job did everything it was asked.
    Success,
    /// The job ran but part of it failed.
    Failed,
}

impl From<JobOutcome> for JobRunStatus {
    fn from(outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Success => Self::Success,
            JobOutcome::Failed => Self::Failed,
        }
    }
}

/// Record of one background job execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRun {
    id: JobRunId,
    org_id: Option<OrgId>,
    job_type: String,
    status: JobRunStatus,
    message: Option<String>,
    result: Option<Value>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedJobRunData {
    /// Persisted identifier.
    pub id: JobRunId,
    /// Organization, if known.
    pub org_id: Option<OrgId>,
    /// Job type such as `sla.scan`.
    pub job_type: String,
    /// Lifecycle status.
    pub status: JobRunStatus,
    /// Status message.
    pub message: Option<String>,
    /// Result payload.
    pub result: Option<Value>,
    /// Start timestamp.
    pub started_at: DateTime<Utc>,
    /// Finish timestamp.
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRun {
    /// Starts a run in the `Running` status.
    #[must_use]
    pub fn start(
        org_id: Option<OrgId>,
        job_type: impl Into<String>,
        message: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: JobRunId::new(),
            org_id,
            job_type: job_type.into(),
            status: JobRunStatus::Running,
            message,
            result: None,
            started_at: clock.utc(),
            finished_at: None,
        }
    }

    /// Reconstructs a run from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedJobRunData) -> Self {
        Self {
            id: data.id,
            org_id: data.org_id,
            job_type: data.job_type,
            status: data.status,
            message: data.message,
            result: data.result,
            started_at: data.started_at,
            finished_at: data.finished_at,
        }
    }

    /// Returns the run identifier.
    #[must_use]
    pub const fn id(&self) -> JobRunId {
        self.id
    }

    /// Returns the organization.
    #[must_use]
    pub const fn org_id(&self) -> Option<OrgId> {
        self.org_id
    }

    /// Returns the job type.
    #[must_use]
    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> JobRunStatus {
        self.status
    }

    /// Returns the status message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the result payload.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        self.result.as_ref()
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

    /// Records the job's terminal outcome.
    ///
    /// A `None` message keeps the message given at start.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerDomainError::JobRunFinished`] when the run is no longer
    /// running.
    pub fn complete(
        &mut self,
        outcome: JobOutcome,
        message: Option<String>,
        result: Option<Value>,
        clock: &impl Clock,
    ) -> Result<(), LedgerDomainError> {
        if self.status != JobRunStatus::Running {
            return Err(LedgerDomainError::JobRunFinished(self.id));
        }
        self.status = outcome.into();
        if message.is_some() {
            self.message = message;
        }
        self.result = result;
        self.finished_at = Some(clock.utc());
        Ok(())
    }

    /// Records an error that stopped the job.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerDomainError::JobRunFinished`] when the run is no longer
    /// running.
    pub fn fail(&mut self, error: &str, clock: &impl Clock) -> Result<(), LedgerDomainError> {
        self.complete(
            JobOutcome::Failed,
            Some(error.to_owned()),
            Some(json!({ "error": error })),
            clock,
        )
    }
}
