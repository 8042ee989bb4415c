//! Error types for run lifecycle transitions and parsing.

use crate::ids::{JobRunId, WorkflowRunId};
use thiserror::Error;

/// Errors returned by run lifecycle transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerDomainError {
    /// The workflow run already reached a terminal status.
    #[error("workflow run {0} is already finished")]
    WorkflowRunFinished(WorkflowRunId),

    /// The job run already reached a terminal status.
    #[error("job run {0} is already finished")]
    JobRunFinished(JobRunId),
}

/// Error returned while parsing run statuses or types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown run value: {0}")]
pub struct ParseRunValueError(pub String);
