//! Repository port for auto-assign rule administration.

use crate::assignment::domain::AutoAssignRule;
use crate::ids::{OrgId, RuleId};
use crate::storage::PersistenceError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for rule repository operations.
pub type RuleRepositoryResult<T> = Result<T, RuleRepositoryError>;

/// Auto-assign rule persistence contract.
#[async_trait]
pub trait AutoAssignRuleRepository: Send + Sync {
    /// Stores a new rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleRepositoryError::DuplicateRule`] when the identifier
    /// exists or [`RuleRepositoryError::UnknownOrganization`] when the
    /// organization does not.
    async fn store(&self, rule: &AutoAssignRule) -> RuleRepositoryResult<()>;

    /// Persists configuration changes to a rule (name, filters, active flag).
    /// The round-robin cursor is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RuleRepositoryError::NotFound`] when the rule does not exist.
    async fn update(&self, rule: &AutoAssignRule) -> RuleRepositoryResult<()>;

    /// Deletes a rule. Returns `false` when no rule was deleted.
    async fn delete(&self, org_id: OrgId, id: RuleId) -> RuleRepositoryResult<bool>;

    /// Finds a rule by identifier.
    async fn find_by_id(&self, id: RuleId) -> RuleRepositoryResult<Option<AutoAssignRule>>;

    /// Lists every rule of an organization, newest first.
    async fn list_for_org(&self, org_id: OrgId) -> RuleRepositoryResult<Vec<AutoAssignRule>>;
}

/// Errors returned by rule repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RuleRepositoryError {
    /// A rule with the same identifier already exists.
    #[error("duplicate auto-assign rule identifier: {0}")]
    DuplicateRule(RuleId),

    /// The rule was not found.
    #[error("auto-assign rule not found: {0}")]
    NotFound(RuleId),

    /// The organization does not exist.
    #[error("unknown organization: {0}")]
    UnknownOrganization(OrgId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RuleRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceError for RuleRepositoryError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}
