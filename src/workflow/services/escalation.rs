//! Notifications and audit entries emitted by workflow scans.

use crate::ids::UserId;
use crate::notification::{
    domain::{AuditEntry, NotificationRequest, NotificationType},
    ports::{AuditSink, NotificationResult, NotificationSink},
};
use crate::ticket::domain::Ticket;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

/// Audit action recorded when a ticket first breaches its SLA.
pub const TICKET_SLA_BREACHED: &str = "TICKET_SLA_BREACHED";

const AUDIT_ENTITY_TICKET: &str = "Ticket";
const SOURCE_AUTO_ASSIGN: &str = "workflow.auto_assign";
const SOURCE_ESCALATION: &str = "workflow.escalation";

/// Emits assignment and SLA escalation side effects for tickets.
#[derive(Clone)]
pub struct Escalations {
    notifications: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditSink>,
}

impl Escalations {
    /// Creates an emitter over the notification and audit sinks.
    #[must_use]
    pub const fn new(notifications: Arc<dyn NotificationSink>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            notifications,
            audit,
        }
    }

    /// Tells the new assignee and the requester about an auto-assignment.
    ///
    /// # Errors
    ///
    /// Returns the sink error when the notifications cannot be stored.
    pub async fn assigned(&self, ticket: &Ticket, assignee_id: UserId) -> NotificationResult<usize> {
        let request = ticket_request(ticket, NotificationType::Assignment, "Assigned")
            .with_recipients([assignee_id, ticket.requester_id()])
            .with_metadata(json!({
                "ticketId": ticket.id().to_string(),
                "source": SOURCE_AUTO_ASSIGN,
            }));
        self.notifications.create_in_app(&request).await
    }

    /// Notifies watchers, assignee, and requester that the ticket is at risk.
    ///
    /// # Errors
    ///
    /// Returns the sink error when the notifications cannot be stored.
    pub async fn at_risk(&self, ticket: &Ticket) -> NotificationResult<usize> {
        let request = escalation_request(ticket, NotificationType::SlaAtRisk, "SLA at risk");
        self.notifications.create_in_app(&request).await
    }

    /// Notifies the escalation recipients of a breach and records the
    /// breach in the audit trail.
    ///
    /// # Errors
    ///
    /// Returns the sink error when the notifications or the audit entry
    /// cannot be stored.
    pub async fn breached(
        &self,
        ticket: &Ticket,
        actor: Option<UserId>,
        at: DateTime<Utc>,
    ) -> NotificationResult<usize> {
        let request = escalation_request(ticket, NotificationType::SlaBreached, "SLA breached");
        let created = self.notifications.create_in_app(&request).await?;
        let entry = AuditEntry::new(
            ticket.org_id(),
            TICKET_SLA_BREACHED,
            AUDIT_ENTITY_TICKET,
            ticket.id().to_string(),
            at,
        )
        .with_actor(actor)
        .with_metadata(json!({
            "ticketKey": ticket.key().as_str(),
            "dueAt": ticket.due_at().map(|due| due.to_rfc3339()),
            "breachedAt": ticket.breached_at().map(|breached| breached.to_rfc3339()),
        }));
        self.audit.record(&entry).await?;
        Ok(created)
    }
}

fn ticket_request(ticket: &Ticket, kind: NotificationType, prefix: &str) -> NotificationRequest {
    NotificationRequest::new(
        ticket.org_id(),
        kind,
        format!("{prefix}: {}", ticket.key().as_str()),
        ticket.title(),
    )
    .with_link(format!("/tickets/{}", ticket.id()))
}

fn escalation_request(ticket: &Ticket, kind: NotificationType, prefix: &str) -> NotificationRequest {
    ticket_request(ticket, kind, prefix)
        .with_recipients(ticket.escalation_recipients())
        .with_metadata(json!({
            "ticketId": ticket.id().to_string(),
            "source": SOURCE_ESCALATION,
        }))
}
