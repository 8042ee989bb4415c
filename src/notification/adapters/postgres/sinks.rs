//! `PostgreSQL` notification sink, audit sink, and email outbox.

use super::models::{AuditLogRow, EmailRow, NotificationRow};
use crate::ids::{EmailId, OrgId, UserId};
use crate::notification::{
    domain::{AuditEntry, EmailStatus, Notification, NotificationRequest, QueuedEmail},
    ports::{AuditSink, EmailOutbox, NotificationResult, NotificationSink, NotificationStoreError},
};
use crate::storage::postgres::schema::{audit_logs, email_queue, notifications};
use crate::storage::postgres::{PgPool, is_foreign_key_violation, run_blocking, to_row_limit};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use mockable::Clock;
use std::sync::Arc;

fn map_insert_error(org_id: OrgId) -> impl FnOnce(DieselError) -> NotificationStoreError {
    move |err| {
        if is_foreign_key_violation(&err) {
            NotificationStoreError::UnknownOrganization(org_id)
        } else {
            NotificationStoreError::persistence(err)
        }
    }
}

/// `PostgreSQL`-backed notification sink.
#[derive(Debug, Clone)]
pub struct PostgresNotificationSink<C: Clock + Send + Sync> {
    pool: PgPool,
    clock: Arc<C>,
}

impl<C: Clock + Send + Sync> PostgresNotificationSink<C> {
    /// Creates a sink from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool, clock: Arc<C>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl<C: Clock + Send + Sync> NotificationSink for PostgresNotificationSink<C> {
    async fn create_in_app(&self, request: &NotificationRequest) -> NotificationResult<usize> {
        let rows: Vec<NotificationRow> = request
            .to_notifications(self.clock.utc())
            .iter()
            .map(NotificationRow::from_notification)
            .collect();
        if rows.is_empty() {
            return Ok(0);
        }
        let org_id = request.org_id();
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(notifications::table)
                .values(&rows)
                .execute(connection)
                .map_err(map_insert_error(org_id))
        })
        .await
    }

    async fn list_for_user(
        &self,
        org_id: OrgId,
        user_id: UserId,
        limit: usize,
    ) -> NotificationResult<Vec<Notification>> {
        let row_limit = to_row_limit::<NotificationStoreError>(limit)?;
        run_blocking(&self.pool, move |connection| {
            notifications::table
                .filter(notifications::org_id.eq(org_id.into_inner()))
                .filter(notifications::user_id.eq(user_id.into_inner()))
                .order((notifications::created_at.desc(), notifications::id.asc()))
                .limit(row_limit)
                .select(NotificationRow::as_select())
                .load::<NotificationRow>(connection)
                .map_err(NotificationStoreError::persistence)?
                .into_iter()
                .map(NotificationRow::into_notification)
                .collect()
        })
        .await
    }
}

/// `PostgreSQL`-backed audit sink.
#[derive(Debug, Clone)]
pub struct PostgresAuditSink {
    pool: PgPool,
}

impl PostgresAuditSink {
    /// Creates a sink from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PostgresAuditSink {
    async fn record(&self, entry: &AuditEntry) -> NotificationResult<()> {
        let org_id = entry.org_id();
        let row = AuditLogRow::from_entry(entry);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(audit_logs::table)
                .values(&row)
                .execute(connection)
                .map_err(map_insert_error(org_id))?;
            Ok(())
        })
        .await
    }

    async fn list_for_entity(
        &self,
        org_id: OrgId,
        entity_type: &str,
        entity_id: &str,
    ) -> NotificationResult<Vec<AuditEntry>> {
        let kind = entity_type.to_owned();
        let id = entity_id.to_owned();
        run_blocking(&self.pool, move |connection| {
            let rows = audit_logs::table
                .filter(audit_logs::org_id.eq(org_id.into_inner()))
                .filter(audit_logs::entity_type.eq(kind))
                .filter(audit_logs::entity_id.eq(id))
                .order((audit_logs::created_at.asc(), audit_logs::id.asc()))
                .select(AuditLogRow::as_select())
                .load::<AuditLogRow>(connection)
                .map_err(NotificationStoreError::persistence)?;
            Ok(rows.into_iter().map(AuditLogRow::into_entry).collect())
        })
        .await
    }
}

/// `PostgreSQL`-backed email outbox.
#[derive(Debug, Clone)]
pub struct PostgresEmailOutbox {
    pool: PgPool,
}

impl PostgresEmailOutbox {
    /// Creates an outbox from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmailOutbox for PostgresEmailOutbox {
    async fn queue(&self, email: &QueuedEmail) -> NotificationResult<()> {
        let org_id = email.org_id();
        let row = EmailRow::from_email(email)?;
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(email_queue::table)
                .values(&row)
                .execute(connection)
                .map_err(map_insert_error(org_id))?;
            Ok(())
        })
        .await
    }

    async fn pending(
        &self,
        org_id: Option<OrgId>,
        limit: usize,
    ) -> NotificationResult<Vec<QueuedEmail>> {
        let row_limit = to_row_limit::<NotificationStoreError>(limit)?;
        run_blocking(&self.pool, move |connection| {
            let mut query = email_queue::table
                .filter(email_queue::status.eq(EmailStatus::Pending.as_str()))
                .order((email_queue::created_at.asc(), email_queue::id.asc()))
                .limit(row_limit)
                .select(EmailRow::as_select())
                .into_boxed();
            if let Some(org) = org_id {
                query = query.filter(email_queue::org_id.eq(org.into_inner()));
            }
            query
                .load::<EmailRow>(connection)
                .map_err(NotificationStoreError::persistence)?
                .into_iter()
                .map(EmailRow::into_email)
                .collect()
        })
        .await
    }

    async fn mark_sent(&self, ids: &[EmailId], at: DateTime<Utc>) -> NotificationResult<usize> {
        let raw_ids: Vec<uuid::Uuid> = ids.iter().copied().map(EmailId::into_inner).collect();
        run_blocking(&self.pool, move |connection| {
            diesel::update(
                email_queue::table
                    .filter(email_queue::id.eq_any(raw_ids))
                    .filter(email_queue::status.eq(EmailStatus::Pending.as_str())),
            )
            .set((
                email_queue::status.eq(EmailStatus::Sent.as_str()),
                email_queue::attempts.eq(email_queue::attempts + 1),
                email_queue::sent_at.eq(Some(at)),
            ))
            .execute(connection)
            .map_err(NotificationStoreError::persistence)
        })
        .await
    }
}
