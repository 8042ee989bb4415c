//! Unit-of-work port used by the auto-assign resolver.

use crate::assignment::domain::{AgentSeat, AutoAssignRule};
use crate::ids::{CategoryId, MemberId, OrgId, RuleId, TeamId, TicketId, UserId};
use crate::storage::PersistenceError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for assignment store operations.
pub type AssignmentStoreResult<T> = Result<T, AssignmentStoreError>;

/// Reads and writes performed inside one assignment unit of work.
///
/// Methods are synchronous: implementations run them on a connection or lock
/// that is already held for the whole unit of work.
pub trait AssignmentTransaction {
    /// Loads the active rules of an organization that match `category_id` or
    /// have no category. Implementations lock the returned rows until the
    /// unit of work ends.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentStoreError::Persistence`] when the read fails.
    fn active_rules(
        &mut self,
        org_id: OrgId,
        category_id: Option<CategoryId>,
    ) -> AssignmentStoreResult<Vec<AutoAssignRule>>;

    /// Loads the Agent-role members of a team.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentStoreError::Persistence`] when the read fails.
    fn agent_seats(
        &mut self,
        org_id: OrgId,
        team_id: TeamId,
    ) -> AssignmentStoreResult<Vec<AgentSeat>>;

    /// Moves a rule's round-robin cursor.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentStoreError::RuleNotFound`] when the rule vanished.
    fn save_cursor(&mut self, rule_id: RuleId, member_id: MemberId) -> AssignmentStoreResult<()>;

    /// Sets team and assignee on a ticket.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentStoreError::TicketNotFound`] when the ticket
    /// vanished.
    fn assign_ticket(
        &mut self,
        ticket_id: TicketId,
        team_id: TeamId,
        assignee_id: UserId,
        at: DateTime<Utc>,
    ) -> AssignmentStoreResult<()>;
}

/// Runs assignment work atomically.
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// Runs `work` as one unit of work.
    ///
    /// Everything written through the transaction commits when `work`
    /// returns `Ok` and is discarded when it returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `work`, or
    /// [`AssignmentStoreError::Persistence`] when the unit of work cannot be
    /// opened or committed.
    async fn within_transaction<T, F>(&self, work: F) -> AssignmentStoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut dyn AssignmentTransaction) -> AssignmentStoreResult<T> + Send + 'static;
}

/// Errors returned by assignment store implementations.
#[derive(Debug, Clone, Error)]
pub enum AssignmentStoreError {
    /// The ticket being assigned does not exist.
    #[error("ticket not found: {0}")]
    TicketNotFound(TicketId),

    /// The rule whose cursor is being moved does not exist.
    #[error("auto-assign rule not found: {0}")]
    RuleNotFound(RuleId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AssignmentStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceError for AssignmentStoreError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}
