//! Domain model for tickets and their SLA state.
//!
//! The SLA evaluator in [`evaluate_sla`] is pure and shared by the workflow
//! orchestrator, the SLA-only scan, and ticket intake.

mod error;
mod sla;
mod status;
mod ticket;

pub use error::{ParseTicketPriorityError, ParseTicketStatusError, TicketDomainError};
pub use sla::{AT_RISK_WINDOW, SlaFlagUpdate, SlaFlags, SlaRule, SlaTransition, evaluate_sla};
pub use status::{TicketPriority, TicketStatus};
pub use ticket::{PersistedTicketData, Ticket, TicketDraft, TicketKey, TicketNumber};
