//! Repository ports for tickets and SLA rules.

use crate::ids::{OrgId, TicketId};
use crate::storage::PersistenceError;
use crate::ticket::domain::{SlaFlagUpdate, SlaRule, Ticket, TicketPriority};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for ticket repository operations.
pub type TicketRepositoryResult<T> = Result<T, TicketRepositoryError>;

/// Ticket persistence contract.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Stores a new ticket together with its watchers.
    ///
    /// # Errors
    ///
    /// Returns [`TicketRepositoryError::DuplicateTicket`] when the identifier
    /// already exists.
    async fn store(&self, ticket: &Ticket) -> TicketRepositoryResult<()>;

    /// Persists changes to an existing ticket, including its watcher list.
    ///
    /// # Errors
    ///
    /// Returns [`TicketRepositoryError::NotFound`] when the ticket does not
    /// exist.
    async fn update(&self, ticket: &Ticket) -> TicketRepositoryResult<()>;

    /// Writes SLA flags computed by a scan, touching only `at_risk`,
    /// `breached_at` and `updated_at`.
    ///
    /// The write is skipped when the stored ticket is no longer active or
    /// its due date or flags differ from the ones the scan evaluated. Returns
    /// the stored ticket after a write, or `None` when it was skipped or the
    /// ticket no longer exists.
    async fn update_sla_flags(
        &self,
        update: &SlaFlagUpdate,
    ) -> TicketRepositoryResult<Option<Ticket>>;

    /// Finds a ticket by identifier.
    async fn find_by_id(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>>;

    /// Lists up to `limit` active tickets of an organization, least recently
    /// updated first.
    async fn list_active(&self, org_id: OrgId, limit: usize)
    -> TicketRepositoryResult<Vec<Ticket>>;

    /// Lists up to `limit` active tickets of an organization that have a due
    /// date, earliest due first.
    async fn list_active_with_due(
        &self,
        org_id: OrgId,
        limit: usize,
    ) -> TicketRepositoryResult<Vec<Ticket>>;
}

/// Errors returned by ticket repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TicketRepositoryError {
    /// A ticket with the same identifier already exists.
    #[error("duplicate ticket identifier: {0}")]
    DuplicateTicket(TicketId),

    /// The ticket was not found.
    #[error("ticket not found: {0}")]
    NotFound(TicketId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TicketRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceError for TicketRepositoryError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

/// Result type for SLA rule repository operations.
pub type SlaRuleRepositoryResult<T> = Result<T, SlaRuleRepositoryError>;

/// SLA rule persistence contract.
#[async_trait]
pub trait SlaRuleRepository: Send + Sync {
    /// Inserts or replaces the rule for its organization and priority.
    ///
    /// # Errors
    ///
    /// Returns [`SlaRuleRepositoryError::UnknownOrganization`] when the
    /// organization does not exist.
    async fn upsert(&self, rule: &SlaRule) -> SlaRuleRepositoryResult<()>;

    /// Finds the rule for an organization and priority.
    async fn find(
        &self,
        org_id: OrgId,
        priority: TicketPriority,
    ) -> SlaRuleRepositoryResult<Option<SlaRule>>;
}

/// Errors returned by SLA rule repository implementations.
#[derive(Debug, Clone, Error)]
pub enum SlaRuleRepositoryError {
    /// The organization does not exist.
    #[error("unknown organization: {0}")]
    UnknownOrganization(OrgId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SlaRuleRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceError for SlaRuleRepositoryError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}
