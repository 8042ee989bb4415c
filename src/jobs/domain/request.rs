//! Job kinds, requests, and idempotency keys.

use super::ParseJobKindError;
use crate::ids::{OrgId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Background job kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobKind {
    /// SLA-only sweep.
    #[serde(rename = "sla.scan")]
    SlaScan,
    /// Workflow automation for one or all organizations.
    #[serde(rename = "workflows.run")]
    WorkflowsRun,
    /// Drain the pending email outbox.
    #[serde(rename = "notifications.flush")]
    NotificationsFlush,
}

impl JobKind {
    /// Every job kind, in scheduling order.
    pub const ALL: [Self; 3] = [Self::SlaScan, Self::WorkflowsRun, Self::NotificationsFlush];

    /// Returns the job type recorded in the ledger.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SlaScan => "sla.scan",
            Self::WorkflowsRun => "workflows.run",
            Self::NotificationsFlush => "notifications.flush",
        }
    }

    /// Initial ledger message for a job of this kind.
    #[must_use]
    pub const fn start_message(self) -> &'static str {
        match self {
            Self::SlaScan => "SLA scan started",
            Self::WorkflowsRun => "Workflow run started",
            Self::NotificationsFlush => "Notification flush started",
        }
    }
}

impl TryFrom<&str> for JobKind {
    type Error = ParseJobKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sla.scan" => Ok(Self::SlaScan),
            "workflows.run" => Ok(Self::WorkflowsRun),
            "notifications.flush" => Ok(Self::NotificationsFlush),
            _ => Err(ParseJobKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request to run a job now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequest {
    /// What to run.
    pub kind: JobKind,
    /// Organization scope; `None` runs for every organization.
    pub org_id: Option<OrgId>,
    /// User who asked for the job.
    pub triggered_by: Option<UserId>,
}

impl JobRequest {
    /// Creates an unscoped, system-triggered request.
    #[must_use]
    pub const fn new(kind: JobKind) -> Self {
        Self {
            kind,
            org_id: None,
            triggered_by: None,
        }
    }

    /// Scopes the request to one organization.
    #[must_use]
    pub const fn for_org(mut self, org_id: OrgId) -> Self {
        self.org_id = Some(org_id);
        self
    }

    /// Attributes the request to a user.
    #[must_use]
    pub const fn triggered_by(mut self, user_id: UserId) -> Self {
        self.triggered_by = Some(user_id);
        self
    }
}

/// Idempotency key `<kind>-<org|all>-<bucket>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobKey(String);

impl JobKey {
    /// Derives the key of `request` at `at`, bucketing time into windows of
    /// `window_secs` seconds. A zero window is treated as one second.
    #[must_use]
    pub fn derive(request: &JobRequest, at: DateTime<Utc>, window_secs: u64) -> Self {
        let scope = request
            .org_id
            .map_or_else(|| "all".to_owned(), |org_id| org_id.to_string());
        let bucket = Self::bucket(at, window_secs);
        Self(format!("{}-{scope}-{bucket}", request.kind.as_str()))
    }

    /// Returns the time bucket containing `at`.
    #[must_use]
    pub fn bucket(at: DateTime<Utc>, window_secs: u64) -> i64 {
        let window = i64::try_from(window_secs.max(1)).unwrap_or(i64::MAX);
        at.timestamp().div_euclid(window)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A keyed job handed to a queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedJob {
    /// Idempotency key.
    pub key: JobKey,
    /// The request to run.
    pub request: JobRequest,
}

/// Result of enqueueing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// The job was handed to the queue.
    Accepted(JobKey),
    /// A job with the same key was already enqueued in this window.
    Duplicate(JobKey),
}

impl EnqueueOutcome {
    /// Returns the idempotency key.
    #[must_use]
    pub const fn key(&self) -> &JobKey {
        match self {
            Self::Accepted(key) | Self::Duplicate(key) => key,
        }
    }

    /// Returns `true` when the job was dispatched.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}
