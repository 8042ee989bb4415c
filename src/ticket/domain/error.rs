//! Error types for ticket domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing ticket domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TicketDomainError {
    /// The ticket title is empty after trimming.
    #[error("ticket title must not be empty")]
    EmptyTitle,

    /// The ticket number is not positive.
    #[error("invalid ticket number {0}, expected a positive integer")]
    InvalidTicketNumber(u64),

    /// An SLA target is zero minutes.
    #[error("SLA target must be at least one minute, got {0}")]
    InvalidSlaTarget(u32),
}

/// Error returned while parsing ticket statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown ticket status: {0}")]
pub struct ParseTicketStatusError(pub String);

/// Error returned while parsing ticket priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown ticket priority: {0}")]
pub struct ParseTicketPriorityError(pub String);
