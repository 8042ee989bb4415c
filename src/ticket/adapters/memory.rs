//! In-memory ticket and SLA rule repositories.

use crate::ids::{OrgId, TicketId};
use crate::storage::memory::{InMemoryDatabase, take_limit};
use crate::ticket::{
    domain::{SlaFlagUpdate, SlaRule, Ticket, TicketPriority},
    ports::{
        SlaRuleRepository, SlaRuleRepositoryError, SlaRuleRepositoryResult, TicketRepository,
        TicketRepositoryError, TicketRepositoryResult,
    },
};
use async_trait::async_trait;

/// Thread-safe in-memory ticket repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTicketRepository {
    db: InMemoryDatabase,
}

impl InMemoryTicketRepository {
    /// Creates a repository over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TicketRepository for InMemoryTicketRepository {
    async fn store(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let mut tables = self.db.write::<TicketRepositoryError>()?;
        if tables.tickets.contains_key(&ticket.id()) {
            return Err(TicketRepositoryError::DuplicateTicket(ticket.id()));
        }
        tables.tickets.insert(ticket.id(), ticket.clone());
        Ok(())
    }

    async fn update(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let mut tables = self.db.write::<TicketRepositoryError>()?;
        let stored = tables
            .tickets
            .get_mut(&ticket.id())
            .ok_or(TicketRepositoryError::NotFound(ticket.id()))?;
        *stored = ticket.clone();
        Ok(())
    }

    async fn update_sla_flags(
        &self,
        update: &SlaFlagUpdate,
    ) -> TicketRepositoryResult<Option<Ticket>> {
        let mut tables = self.db.write::<TicketRepositoryError>()?;
        let Some(stored) = tables.tickets.get_mut(&update.ticket_id) else {
            return Ok(None);
        };
        Ok(stored.apply_sla_flag_update(update).then(|| stored.clone()))
    }

    async fn find_by_id(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>> {
        let tables = self.db.read::<TicketRepositoryError>()?;
        Ok(tables.tickets.get(&id).cloned())
    }

    async fn list_active(
        &self,
        org_id: OrgId,
        limit: usize,
    ) -> TicketRepositoryResult<Vec<Ticket>> {
        let tables = self.db.read::<TicketRepositoryError>()?;
        let mut tickets: Vec<Ticket> = tables
            .tickets
            .values()
            .filter(|ticket| ticket.org_id() == org_id && ticket.is_active())
            .cloned()
            .collect();
        tickets.sort_by_key(|ticket| (ticket.updated_at(), ticket.id()));
        Ok(take_limit(tickets, limit))
    }

    async fn list_active_with_due(
        &self,
        org_id: OrgId,
        limit: usize,
    ) -> TicketRepositoryResult<Vec<Ticket>> {
        let tables = self.db.read::<TicketRepositoryError>()?;
        let mut tickets: Vec<Ticket> = tables
            .tickets
            .values()
            .filter(|ticket| {
                ticket.org_id() == org_id && ticket.is_active() && ticket.due_at().is_some()
            })
            .cloned()
            .collect();
        tickets.sort_by_key(|ticket| (ticket.due_at(), ticket.id()));
        Ok(take_limit(tickets, limit))
    }
}

/// Thread-safe in-memory SLA rule repository.
#[derive(Debug, Clone, Default)]
pub struct InMemorySlaRuleRepository {
    db: InMemoryDatabase,
}

impl InMemorySlaRuleRepository {
    /// Creates a repository over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SlaRuleRepository for InMemorySlaRuleRepository {
    async fn upsert(&self, rule: &SlaRule) -> SlaRuleRepositoryResult<()> {
        let mut tables = self.db.write::<SlaRuleRepositoryError>()?;
        if !tables.organizations.contains_key(&rule.org_id()) {
            return Err(SlaRuleRepositoryError::UnknownOrganization(rule.org_id()));
        }
        tables
            .sla_rules
            .insert((rule.org_id(), rule.priority()), *rule);
        Ok(())
    }

    async fn find(
        &self,
        org_id: OrgId,
        priority: TicketPriority,
    ) -> SlaRuleRepositoryResult<Option<SlaRule>> {
        let tables = self.db.read::<SlaRuleRepositoryError>()?;
        Ok(tables.sla_rules.get(&(org_id, priority)).copied())
    }
}
