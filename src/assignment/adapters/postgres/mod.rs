//! `PostgreSQL` adapters for auto-assignment.

mod models;
mod rules;
mod store;

pub use rules::PostgresAutoAssignRuleRepository;
pub use store::PostgresAssignmentStore;
