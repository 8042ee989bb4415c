//! Auto-assign rules and rule selection.

use super::{AssignmentDomainError, ParseAssignmentStrategyError};
use crate::ids::{CategoryId, MemberId, OrgId, RuleId, TeamId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// How a rule picks an agent from its team's rotation ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Rotate through the ring, remembering the last pick.
    RoundRobin,
    /// Always pick the first agent in the ring.
    TeamDefault,
}

impl AssignmentStrategy {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RoundRobin => "round_robin",
            Self::TeamDefault => "team_default",
        }
    }
}

impl TryFrom<&str> for AssignmentStrategy {
    type Error = ParseAssignmentStrategyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "round_robin" => Ok(Self::RoundRobin),
            "team_default" => Ok(Self::TeamDefault),
            _ => Err(ParseAssignmentStrategyError(value.to_owned())),
        }
    }
}

/// Fields for creating a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAutoAssignRule {
    /// Owning organization.
    pub org_id: OrgId,
    /// Rule name.
    pub name: String,
    /// Category filter; `None` matches every ticket.
    pub category_id: Option<CategoryId>,
    /// Target team; `None` falls back to the ticket's team.
    pub team_id: Option<TeamId>,
    /// Assignment strategy.
    pub strategy: AssignmentStrategy,
}

/// Auto-assign rule with its round-robin cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoAssignRule {
    id: RuleId,
    org_id: OrgId,
    name: String,
    category_id: Option<CategoryId>,
    team_id: Option<TeamId>,
    strategy: AssignmentStrategy,
    is_active: bool,
    last_assigned_member_id: Option<MemberId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAutoAssignRuleData {
    /// Persisted identifier.
    pub id: RuleId,
    /// Owning organization.
    pub org_id: OrgId,
    /// Rule name.
    pub name: String,
    /// Category filter.
    pub category_id: Option<CategoryId>,
    /// Target team.
    pub team_id: Option<TeamId>,
    /// Strategy.
    pub strategy: AssignmentStrategy,
    /// Active flag.
    pub is_active: bool,
    /// Round-robin cursor.
    pub last_assigned_member_id: Option<MemberId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last configuration change.
    pub updated_at: DateTime<Utc>,
}

impl AutoAssignRule {
    /// Creates an active rule without a cursor.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentDomainError::EmptyRuleName`] when the name is
    /// blank.
    pub fn new(
        fields: NewAutoAssignRule,
        clock: &impl Clock,
    ) -> Result<Self, AssignmentDomainError> {
        let name = fields.name.trim().to_owned();
        if name.is_empty() {
            return Err(AssignmentDomainError::EmptyRuleName);
        }
        let now = clock.utc();
        Ok(Self {
            id: RuleId::new(),
            org_id: fields.org_id,
            name,
            category_id: fields.category_id,
            team_id: fields.team_id,
            strategy: fields.strategy,
            is_active: true,
            last_assigned_member_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstructs a rule from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAutoAssignRuleData) -> Self {
        Self {
            id: data.id,
            org_id: data.org_id,
            name: data.name,
            category_id: data.category_id,
            team_id: data.team_id,
            strategy: data.strategy,
            is_active: data.is_active,
            last_assigned_member_id: data.last_assigned_member_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the rule identifier.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the category filter.
    #[must_use]
    pub const fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    /// Returns the target team.
    #[must_use]
    pub const fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }

    /// Returns the strategy.
    #[must_use]
    pub const fn strategy(&self) -> AssignmentStrategy {
        self.strategy
    }

    /// Returns `true` when the rule participates in matching.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the member picked by the last round-robin assignment.
    #[must_use]
    pub const fn last_assigned_member_id(&self) -> Option<MemberId> {
        self.last_assigned_member_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last configuration change timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the rule applies to tickets of `category_id`.
    #[must_use]
    pub fn matches_category(&self, category_id: Option<CategoryId>) -> bool {
        self.category_id.is_none() || self.category_id == category_id
    }

    /// Enables or disables the rule.
    pub fn set_active(&mut self, is_active: bool, clock: &impl Clock) {
        self.is_active = is_active;
        self.updated_at = clock.utc();
    }

    /// Records the member picked by round-robin.
    ///
    /// The cursor is operational state, so `updated_at` is left alone and
    /// rule precedence stays stable.
    pub const fn record_pick(&mut self, member_id: MemberId) {
        self.last_assigned_member_id = Some(member_id);
    }

    /// Overwrites the cursor with the stored value, keeping configuration
    /// edits from rewinding the rotation.
    pub const fn restore_cursor(&mut self, cursor: Option<MemberId>) {
        self.last_assigned_member_id = cursor;
    }
}

/// Picks the rule that governs a ticket of `category_id`.
///
/// Only active rules matching the category (or wildcard rules) qualify.
/// Category-specific rules win over wildcards; within each group the most
/// recently updated rule wins, with the rule id as a final tie-break.
#[must_use]
pub fn select_rule(
    rules: &[AutoAssignRule],
    category_id: Option<CategoryId>,
) -> Option<&AutoAssignRule> {
    rules
        .iter()
        .filter(|rule| rule.is_active() && rule.matches_category(category_id))
        .min_by_key(|rule| {
            (
                rule.category_id().is_none(),
                Reverse(rule.updated_at()),
                rule.id(),
            )
        })
}
