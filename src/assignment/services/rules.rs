//! Administration of auto-assign rules.

use crate::assignment::{
    domain::{AssignmentDomainError, AutoAssignRule, NewAutoAssignRule},
    ports::{AutoAssignRuleRepository, RuleRepositoryError},
};
use crate::ids::{OrgId, RuleId};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for rule administration.
#[derive(Debug, Error)]
pub enum RuleAdminError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AssignmentDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RuleRepositoryError),
    /// The rule does not exist in the organization.
    #[error("auto-assign rule {rule_id} not found in organization {org_id}")]
    NotFound {
        /// Organization searched.
        org_id: OrgId,
        /// Missing rule.
        rule_id: RuleId,
    },
}

/// Result type for rule administration.
pub type RuleAdminResult<T> = Result<T, RuleAdminError>;

/// Creates, toggles, deletes, and lists auto-assign rules.
#[derive(Clone)]
pub struct AutoAssignRuleService<R, C>
where
    R: AutoAssignRuleRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> AutoAssignRuleService<R, C>
where
    R: AutoAssignRuleRepository,
    C: Clock + Send + Sync,
{
    /// Creates a rule administration service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates an active rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleAdminError::Domain`] for a blank name and
    /// [`RuleAdminError::Repository`] when persistence fails.
    pub async fn create_rule(&self, fields: NewAutoAssignRule) -> RuleAdminResult<AutoAssignRule> {
        let rule = AutoAssignRule::new(fields, &*self.clock)?;
        self.repository.store(&rule).await?;
        Ok(rule)
    }

    /// Enables or disables a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleAdminError::NotFound`] when the rule is missing or
    /// belongs to another organization.
    pub async fn set_active(
        &self,
        org_id: OrgId,
        rule_id: RuleId,
        is_active: bool,
    ) -> RuleAdminResult<AutoAssignRule> {
        let mut rule = self
            .repository
            .find_by_id(rule_id)
            .await?
            .filter(|found| found.org_id() == org_id)
            .ok_or(RuleAdminError::NotFound { org_id, rule_id })?;
        rule.set_active(is_active, &*self.clock);
        self.repository.update(&rule).await?;
        Ok(rule)
    }

    /// Deletes a rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleAdminError::NotFound`] when nothing was deleted.
    pub async fn delete_rule(&self, org_id: OrgId, rule_id: RuleId) -> RuleAdminResult<()> {
        if self.repository.delete(org_id, rule_id).await? {
            Ok(())
        } else {
            Err(RuleAdminError::NotFound { org_id, rule_id })
        }
    }

    /// Lists the rules of an organization, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`RuleAdminError::Repository`] when the read fails.
    pub async fn list_rules(&self, org_id: OrgId) -> RuleAdminResult<Vec<AutoAssignRule>> {
        Ok(self.repository.list_for_org(org_id).await?)
    }
}
