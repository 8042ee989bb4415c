//! Port contracts for ticket persistence.

mod repository;

pub use repository::{
    SlaRuleRepository, SlaRuleRepositoryError, SlaRuleRepositoryResult, TicketRepository,
    TicketRepositoryError, TicketRepositoryResult,
};
