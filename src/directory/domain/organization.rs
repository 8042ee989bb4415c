//! Organization aggregate and its validated slug.

use super::DirectoryDomainError;
use crate::ids::OrgId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum slug length, matching the `VARCHAR(64)` column.
const MAX_SLUG_LENGTH: usize = 64;

/// Validated, lowercase organization slug (`[a-z0-9-]`).
///
/// The upper-cased slug prefixes every ticket key of the organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgSlug(String);

impl OrgSlug {
    /// Creates a validated slug. The input is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptySlug`],
    /// [`DirectoryDomainError::SlugTooLong`], or
    /// [`DirectoryDomainError::InvalidSlug`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let raw = value.into();
        let normalized = raw.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(DirectoryDomainError::EmptySlug);
        }
        if normalized.len() > MAX_SLUG_LENGTH {
            return Err(DirectoryDomainError::SlugTooLong(raw));
        }
        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !is_valid {
            return Err(DirectoryDomainError::InvalidSlug(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the upper-cased prefix used in ticket keys.
    #[must_use]
    pub fn key_prefix(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl fmt::Display for OrgSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tenant organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    id: OrgId,
    slug: OrgSlug,
    name: String,
    next_ticket_number: u64,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedOrganizationData {
    /// Persisted identifier.
    pub id: OrgId,
    /// Persisted slug.
    pub slug: OrgSlug,
    /// Persisted display name.
    pub name: String,
    /// Next ticket number to allocate.
    pub next_ticket_number: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// Creates a new organization whose first ticket will be number 1.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyOrganizationName`] when the name
    /// is blank.
    pub fn new(
        slug: OrgSlug,
        name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, DirectoryDomainError> {
        let trimmed = name.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(DirectoryDomainError::EmptyOrganizationName);
        }
        Ok(Self {
            id: OrgId::new(),
            slug,
            name: trimmed,
            next_ticket_number: 1,
            created_at: clock.utc(),
        })
    }

    /// Reconstructs an organization from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedOrganizationData) -> Self {
        Self {
            id: data.id,
            slug: data.slug,
            name: data.name,
            next_ticket_number: data.next_ticket_number,
            created_at: data.created_at,
        }
    }

    /// Returns the organization identifier.
    #[must_use]
    pub const fn id(&self) -> OrgId {
        self.id
    }

    /// Returns the organization slug.
    #[must_use]
    pub const fn slug(&self) -> &OrgSlug {
        &self.slug
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the next ticket number that will be allocated.
    #[must_use]
    pub const fn next_ticket_number(&self) -> u64 {
        self.next_ticket_number
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Hands out the next ticket number and advances the counter.
    pub const fn allocate_ticket_number(&mut self) -> u64 {
        let allocated = self.next_ticket_number;
        self.next_ticket_number = allocated.saturating_add(1);
        allocated
    }
}
