//! Auto-assignment services.

mod resolver;
mod rules;

pub use resolver::{AssignmentError, AssignmentResolver, AssignmentResult, AutoAssignResolver};
pub use rules::{AutoAssignRuleService, RuleAdminError, RuleAdminResult};
