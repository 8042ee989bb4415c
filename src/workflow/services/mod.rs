//! Workflow orchestration services.

mod escalation;
mod guard;
mod orchestrator;
mod sla_scan;

pub use escalation::{Escalations, TICKET_SLA_BREACHED};
pub use guard::{OrgRunGuard, OrgRunPermit};
pub use orchestrator::{
    DEFAULT_WORKFLOW_SCAN_LIMIT, WorkflowError, WorkflowOrchestrator, WorkflowPorts,
    WorkflowResult,
};
pub use sla_scan::{DEFAULT_SLA_SCAN_LIMIT, SlaScanService};
