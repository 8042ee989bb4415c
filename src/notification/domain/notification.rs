//! In-app notifications and the fan-out request that creates them.

use super::ParseNotificationTypeError;
use crate::ids::{NotificationId, OrgId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// A ticket was assigned.
    Assignment,
    /// A ticket is close to its due date.
    SlaAtRisk,
    /// A ticket passed its due date.
    SlaBreached,
    /// A user was mentioned.
    Mention,
    /// Someone asked for access.
    AccessRequest,
    /// An invitation was issued.
    Invite,
    /// System message.
    System,
}

impl NotificationType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assignment => "ASSIGNMENT",
            Self::SlaAtRisk => "SLA_AT_RISK",
            Self::SlaBreached => "SLA_BREACHED",
            Self::Mention => "MENTION",
            Self::AccessRequest => "ACCESS_REQUEST",
            Self::Invite => "INVITE",
            Self::System => "SYSTEM",
        }
    }
}

impl TryFrom<&str> for NotificationType {
    type Error = ParseNotificationTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "ASSIGNMENT" => Ok(Self::Assignment),
            "SLA_AT_RISK" => Ok(Self::SlaAtRisk),
            "SLA_BREACHED" => Ok(Self::SlaBreached),
            "MENTION" => Ok(Self::Mention),
            "ACCESS_REQUEST" => Ok(Self::AccessRequest),
            "INVITE" => Ok(Self::Invite),
            "SYSTEM" => Ok(Self::System),
            _ => Err(ParseNotificationTypeError(value.to_owned())),
        }
    }
}

/// One notification fanned out to a set of users.
///
/// Recipients are deduplicated on insertion and keep their first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    org_id: OrgId,
    kind: NotificationType,
    recipients: Vec<UserId>,
    title: String,
    message: String,
    link: Option<String>,
    metadata: Option<Value>,
}

impl NotificationRequest {
    /// Creates a request without recipients.
    #[must_use]
    pub fn new(
        org_id: OrgId,
        kind: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            org_id,
            kind,
            recipients: Vec::new(),
            title: title.into(),
            message: message.into(),
            link: None,
            metadata: None,
        }
    }

    /// Adds recipients, skipping users already present.
    #[must_use]
    pub fn with_recipients(mut self, users: impl IntoIterator<Item = UserId>) -> Self {
        for user in users {
            if !self.recipients.contains(&user) {
                self.recipients.push(user);
            }
        }
        self
    }

    /// Sets the in-app link.
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Sets the metadata payload.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Returns the organization.
    #[must_use]
    pub const fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the notification type.
    #[must_use]
    pub const fn kind(&self) -> NotificationType {
        self.kind
    }

    /// Returns the deduplicated recipients.
    #[must_use]
    pub fn recipients(&self) -> &[UserId] {
        &self.recipients
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Expands the request into one notification per recipient.
    #[must_use]
    pub fn to_notifications(&self, created_at: DateTime<Utc>) -> Vec<Notification> {
        self.recipients
            .iter()
            .map(|user_id| Notification {
                id: NotificationId::new(),
                org_id: self.org_id,
                user_id: *user_id,
                kind: self.kind,
                title: self.title.clone(),
                message: self.message.clone(),
                link: self.link.clone(),
                metadata: self.metadata.clone(),
                read_at: None,
                created_at,
            })
            .collect()
    }
}

/// Stored in-app notification for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    org_id: OrgId,
    user_id: UserId,
    kind: NotificationType,
    title: String,
    message: String,
    link: Option<String>,
    metadata: Option<Value>,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotificationData {
    /// Persisted identifier.
    pub id: NotificationId,
    /// Owning organization.
    pub org_id: OrgId,
    /// Recipient.
    pub user_id: UserId,
    /// Notification type.
    pub kind: NotificationType,
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

impl Notification {
    /// Reconstructs a notification from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNotificationData) -> Self {
        Self {
            id: data.id,
            org_id: data.org_id,
            user_id: data.user_id,
            kind: data.kind,
            title: data.title,
            message: data.message,
            link: data.link,
            metadata: data.metadata,
            read_at: data.read_at,
            created_at: data.created_at,
        }
    }

    /// Returns the notification identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the notification type.
    #[must_use]
    pub const fn kind(&self) -> NotificationType {
        self.kind
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the body.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the link.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Returns the metadata payload.
    #[must_use]
    pub const fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }

    /// Returns the read timestamp.
    #[must_use]
    pub const fn read_at(&self) -> Option<DateTime<Utc>> {
        self.read_at
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
