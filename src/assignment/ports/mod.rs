//! Port contracts for auto-assignment.

mod rules;
mod store;

pub use rules::{AutoAssignRuleRepository, RuleRepositoryError, RuleRepositoryResult};
pub use store::{
    AssignmentStore, AssignmentStoreError, AssignmentStoreResult, AssignmentTransaction,
};
