//! In-memory notification sink, audit sink, and email outbox.

use crate::ids::{EmailId, OrgId, UserId};
use crate::notification::{
    domain::{AuditEntry, EmailStatus, Notification, NotificationRequest, QueuedEmail},
    ports::{AuditSink, EmailOutbox, NotificationResult, NotificationSink, NotificationStoreError},
};
use crate::storage::memory::{InMemoryDatabase, Tables, take_limit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::cmp::Reverse;
use std::sync::Arc;

fn ensure_organization(tables: &Tables, org_id: OrgId) -> NotificationResult<()> {
    if tables.organizations.contains_key(&org_id) {
        Ok(())
    } else {
        Err(NotificationStoreError::UnknownOrganization(org_id))
    }
}

/// In-memory notification sink stamping notifications with its clock.
#[derive(Debug, Clone)]
pub struct InMemoryNotificationSink<C: Clock + Send + Sync> {
    db: InMemoryDatabase,
    clock: Arc<C>,
}

impl<C: Clock + Send + Sync> InMemoryNotificationSink<C> {
    /// Creates a sink over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase, clock: Arc<C>) -> Self {
        Self { db, clock }
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> NotificationSink for InMemoryNotificationSink<C> {
    async fn create_in_app(&self, request: &NotificationRequest) -> NotificationResult<usize> {
        if request.recipients().is_empty() {
            return Ok(0);
        }
        let mut tables = self.db.write::<NotificationStoreError>()?;
        ensure_organization(&tables, request.org_id())?;
        let created = request.to_notifications(self.clock.utc());
        let count = created.len();
        tables.notifications.extend(created);
        Ok(count)
    }

    async fn list_for_user(
        &self,
        org_id: OrgId,
        user_id: UserId,
        limit: usize,
    ) -> NotificationResult<Vec<Notification>> {
        let tables = self.db.read::<NotificationStoreError>()?;
        let mut found: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|notification| {
                notification.org_id() == org_id && notification.user_id() == user_id
            })
            .cloned()
            .collect();
        found.sort_by_key(|notification| (Reverse(notification.created_at()), notification.id()));
        Ok(take_limit(found, limit))
    }
}

/// In-memory audit sink.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditSink {
    db: InMemoryDatabase,
}

impl InMemoryAuditSink {
    /// Creates a sink over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, entry: &AuditEntry) -> NotificationResult<()> {
        let mut tables = self.db.write::<NotificationStoreError>()?;
        ensure_organization(&tables, entry.org_id())?;
        tables.audit_log.push(entry.clone());
        Ok(())
    }

    async fn list_for_entity(
        &self,
        org_id: OrgId,
        entity_type: &str,
        entity_id: &str,
    ) -> NotificationResult<Vec<AuditEntry>> {
        let tables = self.db.read::<NotificationStoreError>()?;
        Ok(tables
            .audit_log
            .iter()
            .filter(|entry| {
                entry.org_id() == org_id
                    && entry.entity_type() == entity_type
                    && entry.entity_id() == entity_id
            })
            .cloned()
            .collect())
    }
}

/// In-memory email outbox.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailOutbox {
    db: InMemoryDatabase,
}

impl InMemoryEmailOutbox {
    /// Creates an outbox over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EmailOutbox for InMemoryEmailOutbox {
    async fn queue(&self, email: &QueuedEmail) -> NotificationResult<()> {
        let mut tables = self.db.write::<NotificationStoreError>()?;
        ensure_organization(&tables, email.org_id())?;
        tables.email_queue.push(email.clone());
        Ok(())
    }

    async fn pending(
        &self,
        org_id: Option<OrgId>,
        limit: usize,
    ) -> NotificationResult<Vec<QueuedEmail>> {
        let tables = self.db.read::<NotificationStoreError>()?;
        let mut found: Vec<QueuedEmail> = tables
            .email_queue
            .iter()
            .filter(|email| email.status() == EmailStatus::Pending)
            .filter(|email| org_id.is_none_or(|org| email.org_id() == org))
            .cloned()
            .collect();
        found.sort_by_key(|email| (email.created_at(), email.id()));
        Ok(take_limit(found, limit))
    }

    async fn mark_sent(&self, ids: &[EmailId], at: DateTime<Utc>) -> NotificationResult<usize> {
        let mut tables = self.db.write::<NotificationStoreError>()?;
        Ok(tables
            .email_queue
            .iter_mut()
            .filter(|email| ids.contains(&email.id()))
            .map(|email| email.mark_sent(at))
            .filter(|changed| *changed)
            .count())
    }
}
