//! `PostgreSQL` repository implementations for tickets and SLA rules.

use super::models::{NewWatcherRow, SlaRuleRow, TicketRow};
use crate::ids::{CategoryId, OrgId, TeamId, TicketId, UserId};
use crate::storage::postgres::schema::{sla_rules, ticket_watchers, tickets};
use crate::storage::postgres::{
    PgPool, in_transaction, is_foreign_key_violation, is_unique_violation, run_blocking,
    to_row_limit, to_signed, to_unsigned,
};
use crate::ticket::{
    domain::{
        PersistedTicketData, SlaFlagUpdate, SlaRule, Ticket, TicketKey, TicketNumber,
        TicketPriority, TicketStatus,
    },
    ports::{
        SlaRuleRepository, SlaRuleRepositoryError, SlaRuleRepositoryResult, TicketRepository,
        TicketRepositoryError, TicketRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::collections::HashMap;

const ACTIVE_STATUSES: [&str; 3] = [
    TicketStatus::Open.as_str(),
    TicketStatus::InProgress.as_str(),
    TicketStatus::OnHold.as_str(),
];

/// `PostgreSQL`-backed ticket repository.
#[derive(Debug, Clone)]
pub struct PostgresTicketRepository {
    pool: PgPool,
}

impl PostgresTicketRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketRepository for PostgresTicketRepository {
    async fn store(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let ticket_id = ticket.id();
        let row = to_ticket_row(ticket)?;
        let watchers = to_watcher_rows(ticket)?;

        run_blocking(&self.pool, move |connection| {
            in_transaction(connection, |tx| {
                diesel::insert_into(tickets::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| {
                        if is_unique_violation(&err) {
                            TicketRepositoryError::DuplicateTicket(ticket_id)
                        } else {
                            TicketRepositoryError::persistence(err)
                        }
                    })?;
                insert_watchers(tx, &watchers)
            })
        })
        .await
    }

    async fn update(&self, ticket: &Ticket) -> TicketRepositoryResult<()> {
        let ticket_id = ticket.id();
        let row = to_ticket_row(ticket)?;
        let watchers = to_watcher_rows(ticket)?;

        run_blocking(&self.pool, move |connection| {
            in_transaction(connection, |tx| {
                let updated = diesel::update(tickets::table.find(ticket_id.into_inner()))
                    .set(&row)
                    .execute(tx)
                    .map_err(TicketRepositoryError::persistence)?;
                if updated == 0 {
                    return Err(TicketRepositoryError::NotFound(ticket_id));
                }
                diesel::delete(
                    ticket_watchers::table
                        .filter(ticket_watchers::ticket_id.eq(ticket_id.into_inner())),
                )
                .execute(tx)
                .map_err(TicketRepositoryError::persistence)?;
                insert_watchers(tx, &watchers)
            })
        })
        .await
    }

    async fn update_sla_flags(
        &self,
        update: &SlaFlagUpdate,
    ) -> TicketRepositoryResult<Option<Ticket>> {
        let update = *update;
        run_blocking(&self.pool, move |connection| {
            in_transaction(connection, |tx| {
                let target = tickets::table
                    .filter(tickets::id.eq(update.ticket_id.into_inner()))
                    .filter(tickets::status.eq_any(ACTIVE_STATUSES))
                    .filter(tickets::due_at.is_not_distinct_from(update.due_at))
                    .filter(tickets::at_risk.eq(update.expected.at_risk))
                    .filter(tickets::breached_at.is_not_distinct_from(update.expected.breached_at));
                let written = diesel::update(target)
                    .set((
                        tickets::at_risk.eq(update.flags.at_risk),
                        tickets::breached_at.eq(update.flags.breached_at),
                        tickets::updated_at.eq(update.updated_at),
                    ))
                    .execute(tx)
                    .map_err(TicketRepositoryError::persistence)?;
                if written == 0 {
                    return Ok(None);
                }
                let row = tickets::table
                    .find(update.ticket_id.into_inner())
                    .select(TicketRow::as_select())
                    .first::<TicketRow>(tx)
                    .map_err(TicketRepositoryError::persistence)?;
                let mut stored = hydrate(tx, vec![row])?;
                Ok(stored.pop())
            })
        })
        .await
    }

    async fn find_by_id(&self, id: TicketId) -> TicketRepositoryResult<Option<Ticket>> {
        run_blocking(&self.pool, move |connection| {
            let row = tickets::table
                .find(id.into_inner())
                .select(TicketRow::as_select())
                .first::<TicketRow>(connection)
                .optional()
                .map_err(TicketRepositoryError::persistence)?;
            let Some(found) = row else {
                return Ok(None);
            };
            let mut tickets = hydrate(connection, vec![found])?;
            Ok(tickets.pop())
        })
        .await
    }

    async fn list_active(
        &self,
        org_id: OrgId,
        limit: usize,
    ) -> TicketRepositoryResult<Vec<Ticket>> {
        let row_limit = to_row_limit::<TicketRepositoryError>(limit)?;
        run_blocking(&self.pool, move |connection| {
            let rows = tickets::table
                .filter(tickets::org_id.eq(org_id.into_inner()))
                .filter(tickets::status.eq_any(ACTIVE_STATUSES))
                .order((tickets::updated_at.asc(), tickets::id.asc()))
                .limit(row_limit)
                .select(TicketRow::as_select())
                .load::<TicketRow>(connection)
                .map_err(TicketRepositoryError::persistence)?;
            hydrate(connection, rows)
        })
        .await
    }

    async fn list_active_with_due(
        &self,
        org_id: OrgId,
        limit: usize,
    ) -> TicketRepositoryResult<Vec<Ticket>> {
        let row_limit = to_row_limit::<TicketRepositoryError>(limit)?;
        run_blocking(&self.pool, move |connection| {
            let rows = tickets::table
                .filter(tickets::org_id.eq(org_id.into_inner()))
                .filter(tickets::status.eq_any(ACTIVE_STATUSES))
                .filter(tickets::due_at.is_not_null())
                .order((tickets::due_at.asc(), tickets::id.asc()))
                .limit(row_limit)
                .select(TicketRow::as_select())
                .load::<TicketRow>(connection)
                .map_err(TicketRepositoryError::persistence)?;
            hydrate(connection, rows)
        })
        .await
    }
}

fn insert_watchers(
    connection: &mut PgConnection,
    watchers: &[NewWatcherRow],
) -> TicketRepositoryResult<()> {
    if watchers.is_empty() {
        return Ok(());
    }
    diesel::insert_into(ticket_watchers::table)
        .values(watchers)
        .execute(connection)
        .map_err(TicketRepositoryError::persistence)?;
    Ok(())
}

/// Loads watchers for the given rows and converts them into tickets,
/// preserving row order.
fn hydrate(
    connection: &mut PgConnection,
    rows: Vec<TicketRow>,
) -> TicketRepositoryResult<Vec<Ticket>> {
    let ids: Vec<uuid::Uuid> = rows.iter().map(|row| row.id).collect();
    let watcher_pairs = ticket_watchers::table
        .filter(ticket_watchers::ticket_id.eq_any(ids))
        .order((ticket_watchers::ticket_id.asc(), ticket_watchers::position.asc()))
        .select((ticket_watchers::ticket_id, ticket_watchers::user_id))
        .load::<(uuid::Uuid, uuid::Uuid)>(connection)
        .map_err(TicketRepositoryError::persistence)?;

    let mut watchers: HashMap<uuid::Uuid, Vec<UserId>> = HashMap::new();
    for (ticket_id, user_id) in watcher_pairs {
        watchers
            .entry(ticket_id)
            .or_default()
            .push(UserId::from_uuid(user_id));
    }

    rows.into_iter()
        .map(|row| {
            let watcher_ids = watchers.remove(&row.id).unwrap_or_default();
            row_to_ticket(row, watcher_ids)
        })
        .collect()
}

fn to_ticket_row(ticket: &Ticket) -> TicketRepositoryResult<TicketRow> {
    Ok(TicketRow {
        id: ticket.id().into_inner(),
        org_id: ticket.org_id().into_inner(),
        number: to_signed::<TicketRepositoryError>(ticket.number().value())?,
        key: ticket.key().as_str().to_owned(),
        title: ticket.title().to_owned(),
        description: ticket.description().to_owned(),
        status: ticket.status().as_str().to_owned(),
        priority: ticket.priority().as_str().to_owned(),
        requester_id: ticket.requester_id().into_inner(),
        assignee_id: ticket.assignee_id().map(UserId::into_inner),
        team_id: ticket.team_id().map(TeamId::into_inner),
        category_id: ticket.category_id().map(CategoryId::into_inner),
        due_at: ticket.due_at(),
        at_risk: ticket.at_risk(),
        breached_at: ticket.breached_at(),
        resolved_at: ticket.resolved_at(),
        closed_at: ticket.closed_at(),
        created_at: ticket.created_at(),
        updated_at: ticket.updated_at(),
    })
}

fn to_watcher_rows(ticket: &Ticket) -> TicketRepositoryResult<Vec<NewWatcherRow>> {
    ticket
        .watchers()
        .iter()
        .enumerate()
        .map(|(position, user_id)| {
            Ok(NewWatcherRow {
                ticket_id: ticket.id().into_inner(),
                user_id: user_id.into_inner(),
                position: i32::try_from(position).map_err(TicketRepositoryError::persistence)?,
            })
        })
        .collect()
}

fn row_to_ticket(row: TicketRow, watchers: Vec<UserId>) -> TicketRepositoryResult<Ticket> {
    let number = TicketNumber::new(to_unsigned::<TicketRepositoryError>(row.number)?)
        .map_err(TicketRepositoryError::persistence)?;
    let status =
        TicketStatus::try_from(row.status.as_str()).map_err(TicketRepositoryError::persistence)?;
    let priority = TicketPriority::try_from(row.priority.as_str())
        .map_err(TicketRepositoryError::persistence)?;

    Ok(Ticket::from_persisted(PersistedTicketData {
        id: TicketId::from_uuid(row.id),
        org_id: OrgId::from_uuid(row.org_id),
        number,
        key: TicketKey::from_persisted(row.key),
        title: row.title,
        description: row.description,
        status,
        priority,
        requester_id: UserId::from_uuid(row.requester_id),
        assignee_id: row.assignee_id.map(UserId::from_uuid),
        team_id: row.team_id.map(TeamId::from_uuid),
        category_id: row.category_id.map(CategoryId::from_uuid),
        due_at: row.due_at,
        at_risk: row.at_risk,
        breached_at: row.breached_at,
        resolved_at: row.resolved_at,
        closed_at: row.closed_at,
        watchers,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

/// `PostgreSQL`-backed SLA rule repository.
#[derive(Debug, Clone)]
pub struct PostgresSlaRuleRepository {
    pool: PgPool,
}

impl PostgresSlaRuleRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SlaRuleRepository for PostgresSlaRuleRepository {
    async fn upsert(&self, rule: &SlaRule) -> SlaRuleRepositoryResult<()> {
        let org_id = rule.org_id();
        let row = SlaRuleRow {
            org_id: org_id.into_inner(),
            priority: rule.priority().as_str().to_owned(),
            response_minutes: i32::try_from(rule.response_minutes())
                .map_err(SlaRuleRepositoryError::persistence)?,
            resolution_minutes: i32::try_from(rule.resolution_minutes())
                .map_err(SlaRuleRepositoryError::persistence)?,
        };
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(sla_rules::table)
                .values(&row)
                .on_conflict((sla_rules::org_id, sla_rules::priority))
                .do_update()
                .set((
                    sla_rules::response_minutes.eq(row.response_minutes),
                    sla_rules::resolution_minutes.eq(row.resolution_minutes),
                ))
                .execute(connection)
                .map_err(|err| {
                    if is_foreign_key_violation(&err) {
                        SlaRuleRepositoryError::UnknownOrganization(org_id)
                    } else {
                        SlaRuleRepositoryError::persistence(err)
                    }
                })?;
            Ok(())
        })
        .await
    }

    async fn find(
        &self,
        org_id: OrgId,
        priority: TicketPriority,
    ) -> SlaRuleRepositoryResult<Option<SlaRule>> {
        run_blocking(&self.pool, move |connection| {
            let row = sla_rules::table
                .find((org_id.into_inner(), priority.as_str()))
                .select(SlaRuleRow::as_select())
                .first::<SlaRuleRow>(connection)
                .optional()
                .map_err(SlaRuleRepositoryError::persistence)?;
            row.map(row_to_sla_rule).transpose()
        })
        .await
    }
}

fn row_to_sla_rule(row: SlaRuleRow) -> SlaRuleRepositoryResult<SlaRule> {
    let priority = TicketPriority::try_from(row.priority.as_str())
        .map_err(SlaRuleRepositoryError::persistence)?;
    let response =
        u32::try_from(row.response_minutes).map_err(SlaRuleRepositoryError::persistence)?;
    let resolution =
        u32::try_from(row.resolution_minutes).map_err(SlaRuleRepositoryError::persistence)?;
    SlaRule::new(OrgId::from_uuid(row.org_id), priority, response, resolution)
        .map_err(SlaRuleRepositoryError::persistence)
}
