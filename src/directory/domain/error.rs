//! Error types for directory domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing directory domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryDomainError {
    /// The organization slug is empty after trimming.
    #[error("organization slug must not be empty")]
    EmptySlug,

    /// The organization slug contains characters outside `[a-z0-9-]`.
    #[error(
        "organization slug '{0}' contains invalid characters (only lowercase alphanumeric and hyphens allowed)"
    )]
    InvalidSlug(String),

    /// The organization slug exceeds the 64-character storage limit.
    #[error("organization slug exceeds 64 character limit: {0}")]
    SlugTooLong(String),

    /// The organization name is empty after trimming.
    #[error("organization name must not be empty")]
    EmptyOrganizationName,

    /// The team name is empty after trimming.
    #[error("team name must not be empty")]
    EmptyTeamName,
}

/// Error returned while parsing member roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown member role: {0}")]
pub struct ParseMemberRoleError(pub String);
