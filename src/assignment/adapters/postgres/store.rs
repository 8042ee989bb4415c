//! `PostgreSQL` unit of work for auto-assignment.

use super::models::AutoAssignRuleRow;
use crate::assignment::{
    domain::{AgentSeat, AutoAssignRule},
    ports::{AssignmentStore, AssignmentStoreError, AssignmentStoreResult, AssignmentTransaction},
};
use crate::directory::domain::MemberRole;
use crate::ids::{CategoryId, MemberId, OrgId, RuleId, TeamId, TicketId, UserId};
use crate::storage::postgres::schema::{auto_assign_rules, members, team_members, tickets};
use crate::storage::postgres::{PgPool, in_transaction, run_blocking};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;

/// Assignment store running each unit of work in one database transaction.
///
/// Candidate rules are read with `FOR UPDATE`, so concurrent assignments
/// against the same rule serialize on its cursor.
#[derive(Debug, Clone)]
pub struct PostgresAssignmentStore {
    pool: PgPool,
}

impl PostgresAssignmentStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore for PostgresAssignmentStore {
    async fn within_transaction<T, F>(&self, work: F) -> AssignmentStoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn AssignmentTransaction) -> AssignmentStoreResult<T> + Send + 'static,
    {
        run_blocking(&self.pool, move |connection| {
            in_transaction(connection, |tx| {
                let mut unit = PgAssignmentTransaction { connection: tx };
                work(&mut unit)
            })
        })
        .await
    }
}

struct PgAssignmentTransaction<'a> {
    connection: &'a mut PgConnection,
}

impl AssignmentTransaction for PgAssignmentTransaction<'_> {
    fn active_rules(
        &mut self,
        org_id: OrgId,
        category_id: Option<CategoryId>,
    ) -> AssignmentStoreResult<Vec<AutoAssignRule>> {
        let candidates = auto_assign_rules::table
            .filter(auto_assign_rules::org_id.eq(org_id.into_inner()))
            .filter(auto_assign_rules::is_active.eq(true));
        let rows = match category_id {
            Some(category) => candidates
                .filter(
                    auto_assign_rules::category_id
                        .eq(category.into_inner())
                        .or(auto_assign_rules::category_id.is_null()),
                )
                .select(AutoAssignRuleRow::as_select())
                .for_update()
                .load::<AutoAssignRuleRow>(self.connection),
            None => candidates
                .filter(auto_assign_rules::category_id.is_null())
                .select(AutoAssignRuleRow::as_select())
                .for_update()
                .load::<AutoAssignRuleRow>(self.connection),
        }
        .map_err(AssignmentStoreError::persistence)?;

        rows.into_iter()
            .map(AutoAssignRuleRow::into_rule::<AssignmentStoreError>)
            .collect()
    }

    fn agent_seats(
        &mut self,
        org_id: OrgId,
        team_id: TeamId,
    ) -> AssignmentStoreResult<Vec<AgentSeat>> {
        let pairs = team_members::table
            .inner_join(members::table)
            .filter(team_members::team_id.eq(team_id.into_inner()))
            .filter(members::org_id.eq(org_id.into_inner()))
            .filter(members::role.eq(MemberRole::Agent.as_str()))
            .order(members::id.asc())
            .select((members::id, members::user_id))
            .load::<(uuid::Uuid, uuid::Uuid)>(self.connection)
            .map_err(AssignmentStoreError::persistence)?;

        Ok(pairs
            .into_iter()
            .map(|(member_id, user_id)| AgentSeat {
                member_id: MemberId::from_uuid(member_id),
                user_id: UserId::from_uuid(user_id),
            })
            .collect())
    }

    fn save_cursor(&mut self, rule_id: RuleId, member_id: MemberId) -> AssignmentStoreResult<()> {
        let updated = diesel::update(auto_assign_rules::table.find(rule_id.into_inner()))
            .set(auto_assign_rules::last_assigned_member_id.eq(Some(member_id.into_inner())))
            .execute(self.connection)
            .map_err(AssignmentStoreError::persistence)?;
        if updated == 0 {
            return Err(AssignmentStoreError::RuleNotFound(rule_id));
        }
        Ok(())
    }

    fn assign_ticket(
        &mut self,
        ticket_id: TicketId,
        team_id: TeamId,
        assignee_id: UserId,
        at: DateTime<Utc>,
    ) -> AssignmentStoreResult<()> {
        let updated = diesel::update(tickets::table.find(ticket_id.into_inner()))
            .set((
                tickets::team_id.eq(Some(team_id.into_inner())),
                tickets::assignee_id.eq(Some(assignee_id.into_inner())),
                tickets::updated_at.eq(at),
            ))
            .execute(self.connection)
            .map_err(AssignmentStoreError::persistence)?;
        if updated == 0 {
            return Err(AssignmentStoreError::TicketNotFound(ticket_id));
        }
        Ok(())
    }
}
