//! `PostgreSQL` repository for auto-assign rule administration.

use super::models::{AutoAssignRuleRow, RuleConfigChangeset};
use crate::assignment::{
    domain::AutoAssignRule,
    ports::{AutoAssignRuleRepository, RuleRepositoryError, RuleRepositoryResult},
};
use crate::ids::{OrgId, RuleId};
use crate::storage::postgres::schema::auto_assign_rules;
use crate::storage::postgres::{
    PgPool, is_foreign_key_violation, is_unique_violation, run_blocking,
};
use async_trait::async_trait;
use diesel::prelude::*;

/// `PostgreSQL`-backed auto-assign rule repository.
#[derive(Debug, Clone)]
pub struct PostgresAutoAssignRuleRepository {
    pool: PgPool,
}

impl PostgresAutoAssignRuleRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AutoAssignRuleRepository for PostgresAutoAssignRuleRepository {
    async fn store(&self, rule: &AutoAssignRule) -> RuleRepositoryResult<()> {
        let rule_id = rule.id();
        let org_id = rule.org_id();
        let row = AutoAssignRuleRow::from_rule(rule);
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(auto_assign_rules::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| {
                    if is_unique_violation(&err) {
                        RuleRepositoryError::DuplicateRule(rule_id)
                    } else if is_foreign_key_violation(&err) {
                        RuleRepositoryError::UnknownOrganization(org_id)
                    } else {
                        RuleRepositoryError::persistence(err)
                    }
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, rule: &AutoAssignRule) -> RuleRepositoryResult<()> {
        let rule_id = rule.id();
        let changes = RuleConfigChangeset::from_rule(rule);
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(auto_assign_rules::table.find(rule_id.into_inner()))
                .set(&changes)
                .execute(connection)
                .map_err(RuleRepositoryError::persistence)?;
            if updated == 0 {
                return Err(RuleRepositoryError::NotFound(rule_id));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, org_id: OrgId, id: RuleId) -> RuleRepositoryResult<bool> {
        run_blocking(&self.pool, move |connection| {
            let deleted = diesel::delete(
                auto_assign_rules::table
                    .filter(auto_assign_rules::id.eq(id.into_inner()))
                    .filter(auto_assign_rules::org_id.eq(org_id.into_inner())),
            )
            .execute(connection)
            .map_err(RuleRepositoryError::persistence)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn find_by_id(&self, id: RuleId) -> RuleRepositoryResult<Option<AutoAssignRule>> {
        run_blocking(&self.pool, move |connection| {
            let row = auto_assign_rules::table
                .find(id.into_inner())
                .select(AutoAssignRuleRow::as_select())
                .first::<AutoAssignRuleRow>(connection)
                .optional()
                .map_err(RuleRepositoryError::persistence)?;
            row.map(AutoAssignRuleRow::into_rule::<RuleRepositoryError>)
                .transpose()
        })
        .await
    }

    async fn list_for_org(&self, org_id: OrgId) -> RuleRepositoryResult<Vec<AutoAssignRule>> {
        run_blocking(&self.pool, move |connection| {
            let rows = auto_assign_rules::table
                .filter(auto_assign_rules::org_id.eq(org_id.into_inner()))
                .order((auto_assign_rules::created_at.desc(), auto_assign_rules::id.asc()))
                .select(AutoAssignRuleRow::as_select())
                .load::<AutoAssignRuleRow>(connection)
                .map_err(RuleRepositoryError::persistence)?;
            rows.into_iter()
                .map(AutoAssignRuleRow::into_rule::<RuleRepositoryError>)
                .collect()
        })
        .await
    }
}
