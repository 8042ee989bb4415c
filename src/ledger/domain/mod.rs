//! Domain model for workflow and job run records.

mod error;
mod job_run;
mod workflow_run;

pub use error::{LedgerDomainError, ParseRunValueError};
pub use job_run::{JobOutcome, JobRun, JobRunStatus, PersistedJobRunData};
pub use workflow_run::{
    PersistedWorkflowRunData, WorkflowRun, WorkflowRunStatus, WorkflowRunType,
};
