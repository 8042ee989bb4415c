//! Parsing errors for job values.

use thiserror::Error;

/// Error returned when parsing an unknown job kind.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown job kind: {0}")]
pub struct ParseJobKindError(pub String);
