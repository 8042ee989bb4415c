//! `PostgreSQL` adapters for notifications, audit, and the email outbox.

mod models;
mod sinks;

pub use sinks::{PostgresAuditSink, PostgresEmailOutbox, PostgresNotificationSink};
