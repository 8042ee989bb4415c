//! Per-organization and batch results of workflow scans.

use crate::ids::{OrgId, WorkflowRunId};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Outcome of one organization's scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every ticket was processed.
    Success,
    /// The scan stopped at an error; counters are partial.
    Failed,
    /// Another scan of the same organization was already in flight.
    Skipped,
}

impl RunStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Counters accumulated while scanning one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunCounters {
    /// Active tickets loaded for the scan.
    pub scanned: usize,
    /// Tickets assigned by the resolver.
    pub assigned_count: usize,
    /// Tickets that newly became at risk.
    pub at_risk_escalations: usize,
    /// Tickets that newly breached.
    pub breached_escalations: usize,
}

impl RunCounters {
    /// Summary stored on a completed workflow run.
    #[must_use]
    pub fn summary(&self) -> Value {
        json!({
            "scanned": self.scanned,
            "assignedCount": self.assigned_count,
            "atRiskEscalations": self.at_risk_escalations,
            "breachedEscalations": self.breached_escalations,
        })
    }

    /// Summary stored on a failed workflow run: the partial counts plus the
    /// error message.
    #[must_use]
    pub fn failure_summary(&self, error: &str) -> Value {
        let mut summary = self.summary();
        if let Value::Object(fields) = &mut summary {
            fields.insert("error".to_owned(), Value::String(error.to_owned()));
        }
        summary
    }
}

/// Result of scanning one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    /// Scanned organization.
    pub org_id: OrgId,
    /// Workflow run recorded for the scan, when one could be created.
    pub run_id: Option<WorkflowRunId>,
    /// Outcome.
    pub status: RunStatus,
    /// Human-readable outcome message.
    pub message: String,
    /// Counters, partial when the scan failed.
    #[serde(flatten)]
    pub counters: RunCounters,
}

impl RunResult {
    /// A scan that processed every ticket.
    #[must_use]
    pub fn succeeded(org_id: OrgId, run_id: WorkflowRunId, counters: RunCounters) -> Self {
        Self {
            org_id,
            run_id: Some(run_id),
            status: RunStatus::Success,
            message: "Workflow automation completed".to_owned(),
            counters,
        }
    }

    /// A scan that stopped at an error.
    #[must_use]
    pub const fn failed(
        org_id: OrgId,
        run_id: Option<WorkflowRunId>,
        message: String,
        counters: RunCounters,
    ) -> Self {
        Self {
            org_id,
            run_id,
            status: RunStatus::Failed,
            message,
            counters,
        }
    }

    /// A scan rejected because another one is running for the organization.
    #[must_use]
    pub fn skipped(org_id: OrgId) -> Self {
        Self {
            org_id,
            run_id: None,
            status: RunStatus::Skipped,
            message: "Workflow automation already running for this organization".to_owned(),
            counters: RunCounters::default(),
        }
    }

    /// Returns `true` when the scan failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }
}

/// Result of scanning every organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowBatchResult {
    /// Batch message: `completed`, or the number of failed organizations.
    pub message: String,
    /// Number of organizations whose scan failed.
    pub failed_orgs: usize,
    /// One result per organization, oldest organization first.
    pub results: Vec<RunResult>,
}

impl WorkflowBatchResult {
    /// Builds the batch result from per-organization results.
    #[must_use]
    pub fn from_results(results: Vec<RunResult>) -> Self {
        let failed_orgs = results.iter().filter(|result| result.is_failed()).count();
        let message = if failed_orgs == 0 {
            "completed".to_owned()
        } else {
            format!("completed with {failed_orgs} failed org(s)")
        };
        Self {
            message,
            failed_orgs,
            results,
        }
    }

    /// Returns `true` when every organization succeeded or was skipped.
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed_orgs == 0
    }

    /// JSON payload stored on the job run that drove the batch.
    #[must_use]
    pub fn summary(&self) -> Value {
        let orgs: Vec<Value> = self
            .results
            .iter()
            .map(|result| {
                let mut entry = result.counters.summary();
                if let Value::Object(fields) = &mut entry {
                    fields.insert("orgId".to_owned(), Value::String(result.org_id.to_string()));
                    fields.insert(
                        "status".to_owned(),
                        Value::String(result.status.as_str().to_owned()),
                    );
                    fields.insert("message".to_owned(), Value::String(result.message.clone()));
                }
                entry
            })
            .collect();
        json!({
            "message": self.message,
            "failedOrgs": self.failed_orgs,
            "orgs": orgs,
        })
    }
}

/// Result of the SLA-only scan of one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Scanned organization.
    pub org_id: OrgId,
    /// Outcome.
    pub status: RunStatus,
    /// Error message of a failed scan.
    pub error: Option<String>,
    /// Active tickets with a due date loaded for the scan.
    pub scanned: usize,
    /// Tickets whose flags changed and were saved.
    pub updated_count: usize,
    /// Tickets that newly became at risk.
    pub at_risk_count: usize,
    /// Tickets that newly breached.
    pub breach_count: usize,
}

impl ScanSummary {
    /// An empty, successful summary for `org_id`.
    #[must_use]
    pub const fn new(org_id: OrgId) -> Self {
        Self {
            org_id,
            status: RunStatus::Success,
            error: None,
            scanned: 0,
            updated_count: 0,
            at_risk_count: 0,
            breach_count: 0,
        }
    }

    /// Marks the summary failed, keeping the counts gathered so far.
    #[must_use]
    pub fn into_failed(mut self, error: String) -> Self {
        self.status = RunStatus::Failed;
        self.error = Some(error);
        self
    }

    /// JSON payload stored on the job run that drove the scan.
    #[must_use]
    pub fn summary(&self) -> Value {
        json!({
            "orgId": self.org_id.to_string(),
            "status": self.status.as_str(),
            "error": self.error,
            "scanned": self.scanned,
            "updatedCount": self.updated_count,
            "atRiskCount": self.at_risk_count,
            "breachCount": self.breach_count,
        })
    }
}
