//! Domain model for notifications, audit entries, and the email outbox.

mod audit;
mod email;
mod error;
mod notification;

pub use audit::{AuditEntry, PersistedAuditEntryData};
pub use email::{EmailStatus, FlushSummary, PersistedQueuedEmailData, QueuedEmail};
pub use error::{ParseEmailStatusError, ParseNotificationTypeError};
pub use notification::{
    Notification, NotificationRequest, NotificationType, PersistedNotificationData,
};
