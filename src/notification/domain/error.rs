//! Parse errors for notification values read from storage.

use thiserror::Error;

/// Error returned while parsing notification types from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification type: {0}")]
pub struct ParseNotificationTypeError(pub String);

/// Error returned while parsing email statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown email status: {0}")]
pub struct ParseEmailStatusError(pub String);
