//! Ticket aggregate root and its identity values.

use super::{
    SlaFlagUpdate, SlaFlags, SlaTransition, TicketDomainError, TicketPriority, TicketStatus,
    evaluate_sla,
};
use crate::directory::domain::OrgSlug;
use crate::ids::{CategoryId, OrgId, TeamId, TicketId, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential, positive, per-organization ticket number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketNumber(u64);

impl TicketNumber {
    /// Creates a validated ticket number.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidTicketNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, TicketDomainError> {
        if value == 0 {
            return Err(TicketDomainError::InvalidTicketNumber(value));
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Human-readable ticket key such as `ACME-42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketKey(String);

impl TicketKey {
    /// Builds the key from the organization slug and ticket number.
    #[must_use]
    pub fn compose(slug: &OrgSlug, number: TicketNumber) -> Self {
        Self(format!("{}-{}", slug.key_prefix(), number.value()))
    }

    /// Wraps a key read from storage.
    #[must_use]
    pub const fn from_persisted(value: String) -> Self {
        Self(value)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Caller-supplied fields for opening a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    /// Owning organization.
    pub org_id: OrgId,
    /// Ticket title.
    pub title: String,
    /// Ticket description.
    pub description: String,
    /// Ticket priority.
    pub priority: TicketPriority,
    /// Requesting user.
    pub requester_id: UserId,
    /// Pre-selected assignee.
    pub assignee_id: Option<UserId>,
    /// Pre-selected team.
    pub team_id: Option<TeamId>,
    /// Ticket category.
    pub category_id: Option<CategoryId>,
    /// Due date; seeded from the SLA rule when absent.
    pub due_at: Option<DateTime<Utc>>,
}

/// Ticket aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    id: TicketId,
    org_id: OrgId,
    number: TicketNumber,
    key: TicketKey,
    title: String,
    description: String,
    status: TicketStatus,
    priority: TicketPriority,
    requester_id: UserId,
    assignee_id: Option<UserId>,
    team_id: Option<TeamId>,
    category_id: Option<CategoryId>,
    due_at: Option<DateTime<Utc>>,
    at_risk: bool,
    breached_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    watchers: Vec<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTicketData {
    /// Persisted identifier.
    pub id: TicketId,
    /// Owning organization.
    pub org_id: OrgId,
    /// Sequential number.
    pub number: TicketNumber,
    /// Human-readable key.
    pub key: TicketKey,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status.
    pub status: TicketStatus,
    /// Priority.
    pub priority: TicketPriority,
    /// Requesting user.
    pub requester_id: UserId,
    /// Assigned agent.
    pub assignee_id: Option<UserId>,
    /// Assigned team.
    pub team_id: Option<TeamId>,
    /// Category.
    pub category_id: Option<CategoryId>,
    /// SLA due date.
    pub due_at: Option<DateTime<Utc>>,
    /// Stored at-risk flag.
    pub at_risk: bool,
    /// Stored first-breach timestamp.
    pub breached_at: Option<DateTime<Utc>>,
    /// Resolution timestamp.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Closure timestamp.
    pub closed_at: Option<DateTime<Utc>>,
    /// Watching users in insertion order.
    pub watchers: Vec<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Opens a ticket with initial SLA flags evaluated at creation time.
    ///
    /// The requester and any pre-selected assignee start out as watchers.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::EmptyTitle`] when the title is blank.
    pub fn open(
        draft: TicketDraft,
        number: TicketNumber,
        key: TicketKey,
        clock: &impl Clock,
    ) -> Result<Self, TicketDomainError> {
        let title = draft.title.trim().to_owned();
        if title.is_empty() {
            return Err(TicketDomainError::EmptyTitle);
        }

        let now = clock.utc();
        let flags = evaluate_sla(draft.due_at, None, now);
        let mut ticket = Self {
            id: TicketId::new(),
            org_id: draft.org_id,
            number,
            key,
            title,
            description: draft.description,
            status: TicketStatus::Open,
            priority: draft.priority,
            requester_id: draft.requester_id,
            assignee_id: draft.assignee_id,
            team_id: draft.team_id,
            category_id: draft.category_id,
            due_at: draft.due_at,
            at_risk: flags.at_risk,
            breached_at: flags.breached_at,
            resolved_at: None,
            closed_at: None,
            watchers: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        ticket.add_watcher(draft.requester_id);
        if let Some(assignee) = draft.assignee_id {
            ticket.add_watcher(assignee);
        }
        Ok(ticket)
    }

    /// Reconstructs a ticket from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTicketData) -> Self {
        Self {
            id: data.id,
            org_id: data.org_id,
            number: data.number,
            key: data.key,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            requester_id: data.requester_id,
            assignee_id: data.assignee_id,
            team_id: data.team_id,
            category_id: data.category_id,
            due_at: data.due_at,
            at_risk: data.at_risk,
            breached_at: data.breached_at,
            resolved_at: data.resolved_at,
            closed_at: data.closed_at,
            watchers: data.watchers,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the ticket identifier.
    #[must_use]
    pub const fn id(&self) -> TicketId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the sequential number.
    #[must_use]
    pub const fn number(&self) -> TicketNumber {
        self.number
    }

    /// Returns the human-readable key.
    #[must_use]
    pub const fn key(&self) -> &TicketKey {
        &self.key
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TicketStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TicketPriority {
        self.priority
    }

    /// Returns the requesting user.
    #[must_use]
    pub const fn requester_id(&self) -> UserId {
        self.requester_id
    }

    /// Returns the assigned agent, if any.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<UserId> {
        self.assignee_id
    }

    /// Returns the assigned team, if any.
    #[must_use]
    pub const fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }

    /// Returns the category, if any.
    #[must_use]
    pub const fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    /// Returns the SLA due date, if any.
    #[must_use]
    pub const fn due_at(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }

    /// Returns the stored at-risk flag.
    #[must_use]
    pub const fn at_risk(&self) -> bool {
        self.at_risk
    }

    /// Returns the stored first-breach timestamp.
    #[must_use]
    pub const fn breached_at(&self) -> Option<DateTime<Utc>> {
        self.breached_at
    }

    /// Returns the resolution timestamp.
    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns the closure timestamp.
    #[must_use]
    pub const fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
    }

    /// Returns the watching users in insertion order.
    #[must_use]
    pub fn watchers(&self) -> &[UserId] {
        &self.watchers
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the status is scanned by automation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Returns the stored SLA flags.
    #[must_use]
    pub const fn sla_flags(&self) -> SlaFlags {
        SlaFlags {
            at_risk: self.at_risk,
            breached_at: self.breached_at,
        }
    }

    /// Re-evaluates the SLA flags from the stored due date at the clock's
    /// current time and stores them.
    ///
    /// The returned transition tells the caller whether anything changed and
    /// which thresholds were newly crossed.
    pub fn refresh_sla(&mut self, clock: &impl Clock) -> SlaTransition {
        let now = clock.utc();
        let next = evaluate_sla(self.due_at, self.breached_at, now);
        self.apply_sla_flags(next, now)
    }

    /// Describes the write for flags just produced by [`Self::refresh_sla`];
    /// `expected` are the flags the ticket held before the refresh.
    #[must_use]
    pub const fn sla_flag_update(&self, expected: SlaFlags) -> SlaFlagUpdate {
        SlaFlagUpdate {
            ticket_id: self.id,
            due_at: self.due_at,
            expected,
            flags: self.sla_flags(),
            updated_at: self.updated_at,
        }
    }

    /// Applies a scan's SLA flag write.
    ///
    /// Returns `false` and leaves the ticket untouched when it is no longer
    /// active, or when its due date or flags changed after the scan loaded
    /// it.
    pub fn apply_sla_flag_update(&mut self, update: &SlaFlagUpdate) -> bool {
        let unchanged = self.id == update.ticket_id
            && self.is_active()
            && self.due_at == update.due_at
            && self.sla_flags() == update.expected;
        if unchanged {
            self.at_risk = update.flags.at_risk;
            self.breached_at = update.flags.breached_at;
            self.updated_at = update.updated_at;
        }
        unchanged
    }

    /// Changes the due date (the manual edit path).
    ///
    /// Unlike [`Self::refresh_sla`] this may clear a recorded breach: when the
    /// new due date lies in the future, or is removed, the breach timestamp is
    /// dropped. A due date that is still in the past keeps the original
    /// breach timestamp.
    pub fn reschedule(
        &mut self,
        due_at: Option<DateTime<Utc>>,
        clock: &impl Clock,
    ) -> SlaTransition {
        let now = clock.utc();
        let carried = due_at.filter(|due| now > *due).and(self.breached_at);
        let next = evaluate_sla(due_at, carried, now);
        self.due_at = due_at;
        self.updated_at = now;
        self.apply_sla_flags(next, now)
    }

    /// Sets team and assignee as of `at`.
    pub const fn assign(&mut self, team_id: TeamId, assignee_id: UserId, at: DateTime<Utc>) {
        self.team_id = Some(team_id);
        self.assignee_id = Some(assignee_id);
        self.updated_at = at;
    }

    /// Changes the lifecycle status, stamping the resolution or closure time
    /// the first time the ticket enters that status.
    pub fn change_status(&mut self, status: TicketStatus, clock: &impl Clock) {
        let now = clock.utc();
        match status {
            TicketStatus::Resolved => {
                self.resolved_at.get_or_insert(now);
            }
            TicketStatus::Closed => {
                self.closed_at.get_or_insert(now);
            }
            TicketStatus::Open | TicketStatus::InProgress | TicketStatus::OnHold => {}
        }
        self.status = status;
        self.updated_at = now;
    }

    /// Adds a watcher. Returns `false` when the user already watches.
    pub fn add_watcher(&mut self, user_id: UserId) -> bool {
        if self.watchers.contains(&user_id) {
            return false;
        }
        self.watchers.push(user_id);
        true
    }

    /// Users notified about SLA escalations: watchers, then the assignee,
    /// then the requester, without duplicates.
    #[must_use]
    pub fn escalation_recipients(&self) -> Vec<UserId> {
        let mut recipients = self.watchers.clone();
        for user_id in self.assignee_id.into_iter().chain([self.requester_id]) {
            if !recipients.contains(&user_id) {
                recipients.push(user_id);
            }
        }
        recipients
    }

    fn apply_sla_flags(&mut self, next: SlaFlags, now: DateTime<Utc>) -> SlaTransition {
        let transition = SlaTransition::between(&self.sla_flags(), &next);
        if transition.changed {
            self.at_risk = next.at_risk;
            self.breached_at = next.breached_at;
            self.updated_at = now;
        }
        transition
    }
}
