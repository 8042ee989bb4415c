//! Diesel row models for notification persistence.

use crate::ids::{AuditEntryId, EmailId, NotificationId, OrgId, UserId};
use crate::notification::{
    domain::{
        AuditEntry, EmailStatus, Notification, NotificationType, PersistedAuditEntryData,
        PersistedNotificationData, PersistedQueuedEmailData, QueuedEmail,
    },
    ports::{NotificationResult, NotificationStoreError},
};
use crate::storage::postgres::schema::{audit_logs, email_queue, notifications};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query and insert row for notifications.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NotificationRow {
    /// Notification identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub org_id: uuid::Uuid,
    /// Recipient.
    pub user_id: uuid::Uuid,
    /// Notification type.
    pub kind: String,
    /// Title.
    pub title: String,
    /// Body.
    pub message: String,
    /// Link.
    pub link: Option<String>,
    /// Metadata payload.
    pub metadata: Option<Value>,
    /// Read timestamp.
    pub read_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NotificationRow {
    /// Builds an insert row from a domain notification.
    #[must_use]
    pub fn from_notification(notification: &Notification) -> Self {
        Self {
            id: notification.id().into_inner(),
            org_id: notification.org_id().into_inner(),
            user_id: notification.user_id().into_inner(),
            kind: notification.kind().as_str().to_owned(),
            title: notification.title().to_owned(),
            message: notification.message().to_owned(),
            link: notification.link().map(str::to_owned),
            metadata: notification.metadata().cloned(),
            read_at: notification.read_at(),
            created_at: notification.created_at(),
        }
    }

    /// Converts the row into a domain notification.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::Persistence`] for an unknown type.
    pub fn into_notification(self) -> NotificationResult<Notification> {
        let kind = NotificationType::try_from(self.kind.as_str())
            .map_err(NotificationStoreError::persistence)?;
        Ok(Notification::from_persisted(PersistedNotificationData {
            id: NotificationId::from_uuid(self.id),
            org_id: OrgId::from_uuid(self.org_id),
            user_id: UserId::from_uuid(self.user_id),
            kind,
            title: self.title,
            message: self.message,
            link: self.link,
            metadata: self.metadata,
            read_at: self.read_at,
            created_at: self.created_at,
        }))
    }
}

/// Query and insert row for audit entries.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = audit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditLogRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub org_id: uuid::Uuid,
    /// Acting user.
    pub actor_user_id: Option<uuid::Uuid>,
    /// Action name.
    pub action: String,
    /// Entity type.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: String,
    /// Metadata payload.
    pub metadata: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl AuditLogRow {
    /// Builds an insert row from a domain entry.
    #[must_use]
    pub fn from_entry(entry: &AuditEntry) -> Self {
        Self {
            id: entry.id().into_inner(),
            org_id: entry.org_id().into_inner(),
            actor_user_id: entry.actor_user_id().map(UserId::into_inner),
            action: entry.action().to_owned(),
            entity_type: entry.entity_type().to_owned(),
            entity_id: entry.entity_id().to_owned(),
            metadata: entry.metadata().clone(),
            created_at: entry.created_at(),
        }
    }

    /// Converts the row into a domain entry.
    #[must_use]
    pub fn into_entry(self) -> AuditEntry {
        AuditEntry::from_persisted(PersistedAuditEntryData {
            id: AuditEntryId::from_uuid(self.id),
            org_id: OrgId::from_uuid(self.org_id),
            actor_user_id: self.actor_user_id.map(UserId::from_uuid),
            action: self.action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            metadata: self.metadata,
            created_at: self.created_at,
        })
    }
}

/// Query and insert row for queued emails.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = email_queue)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmailRow {
    /// Email identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub org_id: uuid::Uuid,
    /// Recipient address.
    pub to_email: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Delivery status.
    pub status: String,
    /// Delivery attempts.
    pub attempts: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Delivery timestamp.
    pub sent_at: Option<DateTime<Utc>>,
}

impl EmailRow {
    /// Builds an insert row from a domain email.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::Persistence`] when the attempt
    /// count does not fit the column.
    pub fn from_email(email: &QueuedEmail) -> NotificationResult<Self> {
        Ok(Self {
            id: email.id().into_inner(),
            org_id: email.org_id().into_inner(),
            to_email: email.to_email().to_owned(),
            subject: email.subject().to_owned(),
            body: email.body().to_owned(),
            status: email.status().as_str().to_owned(),
            attempts: i32::try_from(email.attempts())
                .map_err(NotificationStoreError::persistence)?,
            created_at: email.created_at(),
            sent_at: email.sent_at(),
        })
    }

    /// Converts the row into a domain email.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationStoreError::Persistence`] for an unknown status
    /// or a negative attempt count.
    pub fn into_email(self) -> NotificationResult<QueuedEmail> {
        let status = EmailStatus::try_from(self.status.as_str())
            .map_err(NotificationStoreError::persistence)?;
        let attempts = u32::try_from(self.attempts).map_err(NotificationStoreError::persistence)?;
        Ok(QueuedEmail::from_persisted(PersistedQueuedEmailData {
            id: EmailId::from_uuid(self.id),
            org_id: OrgId::from_uuid(self.org_id),
            to_email: self.to_email,
            subject: self.subject,
            body: self.body,
            status,
            attempts,
            created_at: self.created_at,
            sent_at: self.sent_at,
        }))
    }
}
