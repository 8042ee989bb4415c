//! Error types for assignment domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing assignment domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignmentDomainError {
    /// The rule name is empty after trimming.
    #[error("auto-assign rule name must not be empty")]
    EmptyRuleName,
}

/// Error returned while parsing assignment strategies from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown assignment strategy: {0}")]
pub struct ParseAssignmentStrategyError(pub String);
