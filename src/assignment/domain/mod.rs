//! Domain model for rule-based auto-assignment.

mod error;
mod ring;
mod rule;

pub use error::{AssignmentDomainError, ParseAssignmentStrategyError};
pub use ring::{AgentPick, AgentSeat, Assignment, AssignmentRequest, RotationRing, pick_agent};
pub use rule::{
    AssignmentStrategy, AutoAssignRule, NewAutoAssignRule, PersistedAutoAssignRuleData,
    select_rule,
};
