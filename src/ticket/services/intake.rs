//! Service layer for opening tickets and manual ticket edits.

use crate::directory::ports::{DirectoryRepository, DirectoryRepositoryError};
use crate::ids::{CategoryId, OrgId, TeamId, TicketId, UserId};
use crate::ticket::{
    domain::{
        Ticket, TicketDomainError, TicketDraft, TicketKey, TicketNumber, TicketPriority,
        TicketStatus,
    },
    ports::{SlaRuleRepository, SlaRuleRepositoryError, TicketRepository, TicketRepositoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for opening a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTicketRequest {
    org_id: OrgId,
    requester_id: UserId,
    title: String,
    description: String,
    priority: TicketPriority,
    category_id: Option<CategoryId>,
    team_id: Option<TeamId>,
    assignee_id: Option<UserId>,
    due_at: Option<DateTime<Utc>>,
}

impl OpenTicketRequest {
    /// Creates a request with required fields and medium priority.
    #[must_use]
    pub fn new(org_id: OrgId, requester_id: UserId, title: impl Into<String>) -> Self {
        Self {
            org_id,
            requester_id,
            title: title.into(),
            description: String::new(),
            priority: TicketPriority::Medium,
            category_id: None,
            team_id: None,
            assignee_id: None,
            due_at: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Sets the team.
    #[must_use]
    pub const fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Sets the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Sets an explicit due date, bypassing the SLA rule.
    #[must_use]
    pub const fn with_due_at(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }
}

/// Service-level errors for ticket intake.
#[derive(Debug, Error)]
pub enum TicketIntakeError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TicketDomainError),
    /// Ticket repository operation failed.
    #[error(transparent)]
    Tickets(#[from] TicketRepositoryError),
    /// SLA rule lookup failed.
    #[error(transparent)]
    SlaRules(#[from] SlaRuleRepositoryError),
    /// Directory operation failed.
    #[error(transparent)]
    Directory(#[from] DirectoryRepositoryError),
    /// The ticket does not exist.
    #[error("ticket not found: {0}")]
    NotFound(TicketId),
}

/// Result type for ticket intake operations.
pub type TicketIntakeResult<T> = Result<T, TicketIntakeError>;

/// Opens tickets and applies manual edits.
#[derive(Clone)]
pub struct TicketIntakeService<D, T, S, C>
where
    D: DirectoryRepository,
    T: TicketRepository,
    S: SlaRuleRepository,
    C: Clock + Send + Sync,
{
    directory: Arc<D>,
    tickets: Arc<T>,
    sla_rules: Arc<S>,
    clock: Arc<C>,
}

impl<D, T, S, C> TicketIntakeService<D, T, S, C>
where
    D: DirectoryRepository,
    T: TicketRepository,
    S: SlaRuleRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new intake service.
    #[must_use]
    pub const fn new(directory: Arc<D>, tickets: Arc<T>, sla_rules: Arc<S>, clock: Arc<C>) -> Self {
        Self {
            directory,
            tickets,
            sla_rules,
            clock,
        }
    }

    /// Opens a ticket.
    ///
    /// Allocates the organization's next number, builds the `SLUG-N` key, and
    /// seeds the due date from the SLA rule for the priority when the request
    /// has none. Initial SLA flags are evaluated at creation time.
    ///
    /// # Errors
    ///
    /// Returns [`TicketIntakeError`] when the title is blank, the
    /// organization is unknown, or persistence fails.
    pub async fn open_ticket(&self, request: OpenTicketRequest) -> TicketIntakeResult<Ticket> {
        if request.title.trim().is_empty() {
            return Err(TicketDomainError::EmptyTitle.into());
        }

        let due_at = match request.due_at {
            Some(explicit) => Some(explicit),
            None => self
                .sla_rules
                .find(request.org_id, request.priority)
                .await?
                .and_then(|rule| rule.due_from(self.clock.utc())),
        };

        let (organization, allocated) = self
            .directory
            .allocate_ticket_number(request.org_id)
            .await?;
        let number = TicketNumber::new(allocated)?;
        let key = TicketKey::compose(organization.slug(), number);

        let draft = TicketDraft {
            org_id: request.org_id,
            title: request.title,
            description: request.description,
            priority: request.priority,
            requester_id: request.requester_id,
            assignee_id: request.assignee_id,
            team_id: request.team_id,
            category_id: request.category_id,
            due_at,
        };
        let ticket = Ticket::open(draft, number, key, &*self.clock)?;
        self.tickets.store(&ticket).await?;
        Ok(ticket)
    }

    /// Changes a ticket's due date.
    ///
    /// This is the only path that can clear a recorded breach.
    ///
    /// # Errors
    ///
    /// Returns [`TicketIntakeError::NotFound`] when the ticket does not exist.
    pub async fn reschedule(
        &self,
        ticket_id: TicketId,
        due_at: Option<DateTime<Utc>>,
    ) -> TicketIntakeResult<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        ticket.reschedule(due_at, &*self.clock);
        self.tickets.update(&ticket).await?;
        Ok(ticket)
    }

    /// Changes a ticket's status.
    ///
    /// # Errors
    ///
    /// Returns [`TicketIntakeError::NotFound`] when the ticket does not exist.
    pub async fn change_status(
        &self,
        ticket_id: TicketId,
        status: TicketStatus,
    ) -> TicketIntakeResult<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        ticket.change_status(status, &*self.clock);
        self.tickets.update(&ticket).await?;
        Ok(ticket)
    }

    /// Adds a watcher to a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`TicketIntakeError::NotFound`] when the ticket does not exist.
    pub async fn watch(&self, ticket_id: TicketId, user_id: UserId) -> TicketIntakeResult<Ticket> {
        let mut ticket = self.load(ticket_id).await?;
        if ticket.add_watcher(user_id) {
            self.tickets.update(&ticket).await?;
        }
        Ok(ticket)
    }

    async fn load(&self, ticket_id: TicketId) -> TicketIntakeResult<Ticket> {
        self.tickets
            .find_by_id(ticket_id)
            .await?
            .ok_or(TicketIntakeError::NotFound(ticket_id))
    }
}
