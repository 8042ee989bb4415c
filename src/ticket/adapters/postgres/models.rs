//! Diesel row models for ticket persistence.

use crate::storage::postgres::schema::{sla_rules, ticket_watchers, tickets};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query, insert, and update row for tickets.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct TicketRow {
    /// Ticket identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub org_id: uuid::Uuid,
    /// Sequential number.
    pub number: i64,
    /// Human-readable key.
    pub key: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: String,
    /// Priority.
    pub priority: String,
    /// Requesting user.
    pub requester_id: uuid::Uuid,
    /// Assigned agent.
    pub assignee_id: Option<uuid::Uuid>,
    /// Assigned team.
    pub team_id: Option<uuid::Uuid>,
    /// Category.
    pub category_id: Option<uuid::Uuid>,
    /// SLA due date.
    pub due_at: Option<DateTime<Utc>>,
    /// At-risk flag.
    pub at_risk: bool,
    /// First breach timestamp.
    pub breached_at: Option<DateTime<Utc>>,
    /// Resolution timestamp.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Closure timestamp.
    pub closed_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert row for ticket watchers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = ticket_watchers)]
pub struct NewWatcherRow {
    /// Ticket identifier.
    pub ticket_id: uuid::Uuid,
    /// Watching user.
    pub user_id: uuid::Uuid,
    /// Insertion order.
    pub position: i32,
}

/// Query and insert row for SLA rules.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = sla_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SlaRuleRow {
    /// Owning organization.
    pub org_id: uuid::Uuid,
    /// Priority.
    pub priority: String,
    /// First-response target in minutes.
    pub response_minutes: i32,
    /// Resolution target in minutes.
    pub resolution_minutes: i32,
}
