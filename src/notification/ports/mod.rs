//! Port contracts for notifications, auditing, and the email outbox.

use crate::ids::{EmailId, OrgId, UserId};
use crate::notification::domain::{AuditEntry, Notification, NotificationRequest, QueuedEmail};
use crate::storage::PersistenceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for notification port operations.
pub type NotificationResult<T> = Result<T, NotificationStoreError>;

/// In-app notification fan-out.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Creates one notification per distinct recipient of `request`.
    ///
    /// Returns the number of notifications created; a request without
    /// recipients creates nothing and returns zero.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::UnknownOrganization`] when the
    /// organization does not exist.
    async fn create_in_app(&self, request: &NotificationRequest) -> NotificationResult<usize>;

    /// Lists a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::Persistence`] when the read fails.
    async fn list_for_user(
        &self,
        org_id: OrgId,
        user_id: UserId,
        limit: usize,
    ) -> NotificationResult<Vec<Notification>>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records an entry.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::UnknownOrganization`] when the
    /// organization does not exist.
    async fn record(&self, entry: &AuditEntry) -> NotificationResult<()>;

    /// Lists the entries recorded for one entity, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::Persistence`] when the read fails.
    async fn list_for_entity(
        &self,
        org_id: OrgId,
        entity_type: &str,
        entity_id: &str,
    ) -> NotificationResult<Vec<AuditEntry>>;
}

/// Outbound email queue.
#[async_trait]
pub trait EmailOutbox: Send + Sync {
    /// Queues an email for the next flush.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::UnknownOrganization`] when the
    /// organization does not exist.
    async fn queue(&self, email: &QueuedEmail) -> NotificationResult<()>;

    /// Lists pending emails oldest first, optionally for one organization.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::Persistence`] when the read fails.
    async fn pending(
        &self,
        org_id: Option<OrgId>,
        limit: usize,
    ) -> NotificationResult<Vec<QueuedEmail>>;

    /// Marks the given pending emails sent. Returns how many changed.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::Persistence`] when the write fails.
    async fn mark_sent(&self, ids: &[EmailId], at: DateTime<Utc>) -> NotificationResult<usize>;
}

/// Errors returned by notification, audit, and outbox adapters.
#[derive(Debug, Clone, Error)]
pub enum NotificationStoreError {
    /// The organization does not exist.
    #[error("unknown organization: {0}")]
    UnknownOrganization(OrgId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl NotificationStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceError for NotificationStoreError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}
