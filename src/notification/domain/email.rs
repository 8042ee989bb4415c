//! Queued outbound email.

use super::ParseEmailStatusError;
use crate::ids::{EmailId, OrgId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery status of a queued email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    /// Waiting for the next flush.
    Pending,
    /// Handed to the delivery stub.
    Sent,
}

impl EmailStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
        }
    }
}

impl TryFrom<&str> for EmailStatus {
    type Error = ParseEmailStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "sent" => Ok(Self::Sent),
            _ => Err(ParseEmailStatusError(value.to_owned())),
        }
    }
}

/// Email waiting in, or already flushed from, the outbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedEmail {
    id: EmailId,
    org_id: OrgId,
    to_email: String,
    subject: String,
    body: String,
    status: EmailStatus,
    attempts: u32,
    created_at: DateTime<Utc>,
    sent_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedQueuedEmailData {
    /// Persisted identifier.
    pub id: EmailId,
    /// Owning organization.
    pub org_id: OrgId,
    /// Recipient address.
    pub to_email: String,
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
    /// Delivery status.
    pub status: EmailStatus,
    /// Delivery attempts.
    pub attempts: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Delivery timestamp.
    pub sent_at: Option<DateTime<Utc>>,
}

impl QueuedEmail {
    /// Creates a pending email.
    #[must_use]
    pub fn new(
        org_id: OrgId,
        to_email: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EmailId::new(),
            org_id,
            to_email: to_email.into(),
            subject: subject.into(),
            body: body.into(),
            status: EmailStatus::Pending,
            attempts: 0,
            created_at,
            sent_at: None,
        }
    }

    /// Reconstructs an email from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedQueuedEmailData) -> Self {
        Self {
            id: data.id,
            org_id: data.org_id,
            to_email: data.to_email,
            subject: data.subject,
            body: data.body,
            status: data.status,
            attempts: data.attempts,
            created_at: data.created_at,
            sent_at: data.sent_at,
        }
    }

    /// Returns the email identifier.
    #[must_use]
    pub const fn id(&self) -> EmailId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the recipient address.
    #[must_use]
    pub fn to_email(&self) -> &str {
        &self.to_email
    }

    /// Returns the subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the delivery status.
    #[must_use]
    pub const fn status(&self) -> EmailStatus {
        self.status
    }

    /// Returns the number of delivery attempts.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the delivery timestamp.
    #[must_use]
    pub const fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    /// Marks a pending email as sent and counts the attempt.
    ///
    /// Returns `false`, changing nothing, when the email was already sent.
    pub const fn mark_sent(&mut self, at: DateTime<Utc>) -> bool {
        if matches!(self.status, EmailStatus::Sent) {
            return false;
        }
        self.status = EmailStatus::Sent;
        self.attempts = self.attempts.saturating_add(1);
        self.sent_at = Some(at);
        true
    }
}

/// Outcome of flushing the outbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlushSummary {
    /// Pending emails examined.
    pub scanned: usize,
    /// Emails marked sent.
    pub sent: usize,
}
