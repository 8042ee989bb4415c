//! Diesel row models for auto-assign rules.

use crate::assignment::domain::{
    AssignmentStrategy, AutoAssignRule, PersistedAutoAssignRuleData,
};
use crate::ids::{CategoryId, MemberId, OrgId, RuleId, TeamId};
use crate::storage::PersistenceError;
use crate::storage::postgres::schema::auto_assign_rules;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query and insert row for auto-assign rules.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = auto_assign_rules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AutoAssignRuleRow {
    /// Rule identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub org_id: uuid::Uuid,
    /// Rule name.
    pub name: String,
    /// Category filter.
    pub category_id: Option<uuid::Uuid>,
    /// Target team.
    pub team_id: Option<uuid::Uuid>,
    /// Strategy name.
    pub strategy: String,
    /// Active flag.
    pub is_active: bool,
    /// Round-robin cursor.
    pub last_assigned_member_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last configuration change.
    pub updated_at: DateTime<Utc>,
}

/// Configuration columns written by rule updates; the cursor is excluded.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = auto_assign_rules)]
#[diesel(treat_none_as_null = true)]
pub struct RuleConfigChangeset {
    /// Rule name.
    pub name: String,
    /// Category filter.
    pub category_id: Option<uuid::Uuid>,
    /// Target team.
    pub team_id: Option<uuid::Uuid>,
    /// Strategy name.
    pub strategy: String,
    /// Active flag.
    pub is_active: bool,
    /// Last configuration change.
    pub updated_at: DateTime<Utc>,
}

impl AutoAssignRuleRow {
    /// Builds an insert row from a domain rule.
    #[must_use]
    pub fn from_rule(rule: &AutoAssignRule) -> Self {
        Self {
            id: rule.id().into_inner(),
            org_id: rule.org_id().into_inner(),
            name: rule.name().to_owned(),
            category_id: rule.category_id().map(CategoryId::into_inner),
            team_id: rule.team_id().map(TeamId::into_inner),
            strategy: rule.strategy().as_str().to_owned(),
            is_active: rule.is_active(),
            last_assigned_member_id: rule.last_assigned_member_id().map(MemberId::into_inner),
            created_at: rule.created_at(),
            updated_at: rule.updated_at(),
        }
    }

    /// Converts the row into a domain rule.
    pub fn into_rule<E: PersistenceError>(self) -> Result<AutoAssignRule, E> {
        let strategy =
            AssignmentStrategy::try_from(self.strategy.as_str()).map_err(E::persistence)?;
        Ok(AutoAssignRule::from_persisted(PersistedAutoAssignRuleData {
            id: RuleId::from_uuid(self.id),
            org_id: OrgId::from_uuid(self.org_id),
            name: self.name,
            category_id: self.category_id.map(CategoryId::from_uuid),
            team_id: self.team_id.map(TeamId::from_uuid),
            strategy,
            is_active: self.is_active,
            last_assigned_member_id: self.last_assigned_member_id.map(MemberId::from_uuid),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }))
    }
}

impl RuleConfigChangeset {
    /// Extracts the configuration columns of a domain rule.
    #[must_use]
    pub fn from_rule(rule: &AutoAssignRule) -> Self {
        Self {
            name: rule.name().to_owned(),
            category_id: rule.category_id().map(CategoryId::into_inner),
            team_id: rule.team_id().map(TeamId::into_inner),
            strategy: rule.strategy().as_str().to_owned(),
            is_active: rule.is_active(),
            updated_at: rule.updated_at(),
        }
    }
}
