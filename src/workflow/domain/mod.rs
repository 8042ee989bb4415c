//! Outcomes of workflow scans.

mod result;

pub use result::{RunCounters, RunResult, RunStatus, ScanSummary, WorkflowBatchResult};
