//! In-memory assignment store and rule repository.

use crate::assignment::{
    domain::{AgentSeat, AutoAssignRule},
    ports::{
        AssignmentStore, AssignmentStoreError, AssignmentStoreResult, AssignmentTransaction,
        AutoAssignRuleRepository, RuleRepositoryError, RuleRepositoryResult,
    },
};
use crate::ids::{CategoryId, MemberId, OrgId, RuleId, TeamId, TicketId, UserId};
use crate::storage::memory::{InMemoryDatabase, Tables};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Reverse;

/// Assignment store that serializes units of work behind the database lock.
///
/// Writes are staged while the work runs and applied only when it succeeds,
/// so a failed unit of work leaves cursors and tickets untouched.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssignmentStore {
    db: InMemoryDatabase,
}

impl InMemoryAssignmentStore {
    /// Creates a store over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }

    fn run<T, F>(&self, work: F) -> AssignmentStoreResult<T>
    where
        F: FnOnce(&mut dyn AssignmentTransaction) -> AssignmentStoreResult<T>,
    {
        let mut tables = self.db.write::<AssignmentStoreError>()?;
        let mut tx = StagedTransaction {
            tables: &*tables,
            cursors: Vec::new(),
            assignments: Vec::new(),
        };
        let value = work(&mut tx)?;
        let StagedTransaction {
            cursors,
            assignments,
            ..
        } = tx;
        apply(&mut *tables, cursors, assignments);
        Ok(value)
    }
}

#[async_trait]
impl AssignmentStore for InMemoryAssignmentStore {
    async fn within_transaction<T, F>(&self, work: F) -> AssignmentStoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn AssignmentTransaction) -> AssignmentStoreResult<T> + Send + 'static,
    {
        self.run(work)
    }
}

struct StagedAssignment {
    ticket_id: TicketId,
    team_id: TeamId,
    assignee_id: UserId,
    at: DateTime<Utc>,
}

struct StagedTransaction<'a> {
    tables: &'a Tables,
    cursors: Vec<(RuleId, MemberId)>,
    assignments: Vec<StagedAssignment>,
}

impl AssignmentTransaction for StagedTransaction<'_> {
    fn active_rules(
        &mut self,
        org_id: OrgId,
        category_id: Option<CategoryId>,
    ) -> AssignmentStoreResult<Vec<AutoAssignRule>> {
        Ok(self
            .tables
            .assign_rules
            .values()
            .filter(|rule| {
                rule.org_id() == org_id && rule.is_active() && rule.matches_category(category_id)
            })
            .map(|rule| {
                let mut staged = rule.clone();
                if let Some((_, member_id)) =
                    self.cursors.iter().rev().find(|(id, _)| *id == rule.id())
                {
                    staged.record_pick(*member_id);
                }
                staged
            })
            .collect())
    }

    fn agent_seats(
        &mut self,
        org_id: OrgId,
        team_id: TeamId,
    ) -> AssignmentStoreResult<Vec<AgentSeat>> {
        Ok(self
            .tables
            .team_members
            .iter()
            .filter(|(team, _)| *team == team_id)
            .filter_map(|(_, member_id)| self.tables.members.get(member_id))
            .filter(|member| member.org_id() == org_id && member.is_agent())
            .map(|member| AgentSeat {
                member_id: member.id(),
                user_id: member.user_id(),
            })
            .collect())
    }

    fn save_cursor(&mut self, rule_id: RuleId, member_id: MemberId) -> AssignmentStoreResult<()> {
        if !self.tables.assign_rules.contains_key(&rule_id) {
            return Err(AssignmentStoreError::RuleNotFound(rule_id));
        }
        self.cursors.push((rule_id, member_id));
        Ok(())
    }

    fn assign_ticket(
        &mut self,
        ticket_id: TicketId,
        team_id: TeamId,
        assignee_id: UserId,
        at: DateTime<Utc>,
    ) -> AssignmentStoreResult<()> {
        if !self.tables.tickets.contains_key(&ticket_id) {
            return Err(AssignmentStoreError::TicketNotFound(ticket_id));
        }
        self.assignments.push(StagedAssignment {
            ticket_id,
            team_id,
            assignee_id,
            at,
        });
        Ok(())
    }
}

fn apply(
    tables: &mut Tables,
    cursors: Vec<(RuleId, MemberId)>,
    assignments: Vec<StagedAssignment>,
) {
    for (rule_id, member_id) in cursors {
        if let Some(rule) = tables.assign_rules.get_mut(&rule_id) {
            rule.record_pick(member_id);
        }
    }
    for staged in assignments {
        if let Some(ticket) = tables.tickets.get_mut(&staged.ticket_id) {
            ticket.assign(staged.team_id, staged.assignee_id, staged.at);
        }
    }
}

/// Thread-safe in-memory rule repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAutoAssignRuleRepository {
    db: InMemoryDatabase,
}

impl InMemoryAutoAssignRuleRepository {
    /// Creates a repository over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AutoAssignRuleRepository for InMemoryAutoAssignRuleRepository {
    async fn store(&self, rule: &AutoAssignRule) -> RuleRepositoryResult<()> {
        let mut tables = self.db.write::<RuleRepositoryError>()?;
        if !tables.organizations.contains_key(&rule.org_id()) {
            return Err(RuleRepositoryError::UnknownOrganization(rule.org_id()));
        }
        if tables.assign_rules.contains_key(&rule.id()) {
            return Err(RuleRepositoryError::DuplicateRule(rule.id()));
        }
        tables.assign_rules.insert(rule.id(), rule.clone());
        Ok(())
    }

    async fn update(&self, rule: &AutoAssignRule) -> RuleRepositoryResult<()> {
        let mut tables = self.db.write::<RuleRepositoryError>()?;
        let stored = tables
            .assign_rules
            .get_mut(&rule.id())
            .ok_or(RuleRepositoryError::NotFound(rule.id()))?;
        let cursor = stored.last_assigned_member_id();
        *stored = rule.clone();
        stored.restore_cursor(cursor);
        Ok(())
    }

    async fn delete(&self, org_id: OrgId, id: RuleId) -> RuleRepositoryResult<bool> {
        let mut tables = self.db.write::<RuleRepositoryError>()?;
        let owned = tables
            .assign_rules
            .get(&id)
            .is_some_and(|rule| rule.org_id() == org_id);
        if owned {
            tables.assign_rules.remove(&id);
        }
        Ok(owned)
    }

    async fn find_by_id(&self, id: RuleId) -> RuleRepositoryResult<Option<AutoAssignRule>> {
        let tables = self.db.read::<RuleRepositoryError>()?;
        Ok(tables.assign_rules.get(&id).cloned())
    }

    async fn list_for_org(&self, org_id: OrgId) -> RuleRepositoryResult<Vec<AutoAssignRule>> {
        let tables = self.db.read::<RuleRepositoryError>()?;
        let mut rules: Vec<AutoAssignRule> = tables
            .assign_rules
            .values()
            .filter(|rule| rule.org_id() == org_id)
            .cloned()
            .collect();
        rules.sort_by_key(|rule| (Reverse(rule.created_at()), rule.id()));
        Ok(rules)
    }
}
