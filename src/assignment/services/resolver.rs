//! Rule-based agent selection for unassigned tickets.

use crate::assignment::{
    domain::{
        Assignment, AssignmentRequest, AutoAssignRule, RotationRing, pick_agent, select_rule,
    },
    ports::{AssignmentStore, AssignmentStoreError},
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while resolving an assignment.
#[derive(Debug, Clone, Error)]
pub enum AssignmentError {
    /// The unit of work failed and was rolled back.
    #[error(transparent)]
    Store(#[from] AssignmentStoreError),
}

/// Result type for assignment resolution.
pub type AssignmentResult<T> = Result<T, AssignmentError>;

/// Chooses and applies an assignee for a ticket.
///
/// Returning `Ok(None)` means no agent was available; it is not an error.
#[async_trait]
pub trait AssignmentResolver: Send + Sync {
    /// Resolves and persists an assignment for the requested ticket.
    ///
    /// # Errors
    ///
    /// Returns [`AssignmentError`] when storage fails. Nothing is written in
    /// that case.
    async fn resolve(&self, request: AssignmentRequest) -> AssignmentResult<Option<Assignment>>;
}

/// Resolver backed by auto-assign rules and team rotation rings.
#[derive(Clone)]
pub struct AutoAssignResolver<A, C>
where
    A: AssignmentStore,
    C: Clock + Send + Sync,
{
    store: Arc<A>,
    clock: Arc<C>,
}

impl<A, C> AutoAssignResolver<A, C>
where
    A: AssignmentStore,
    C: Clock + Send + Sync,
{
    /// Creates a resolver.
    #[must_use]
    pub const fn new(store: Arc<A>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl<A, C> AssignmentResolver for AutoAssignResolver<A, C>
where
    A: AssignmentStore,
    C: Clock + Send + Sync,
{
    async fn resolve(&self, request: AssignmentRequest) -> AssignmentResult<Option<Assignment>> {
        let now = self.clock.utc();
        let outcome = self
            .store
            .within_transaction(move |tx| {
                let rules = tx.active_rules(request.org_id, request.category_id)?;
                let rule = select_rule(&rules, request.category_id);
                let Some(team_id) = rule
                    .and_then(AutoAssignRule::team_id)
                    .or(request.fallback_team_id)
                else {
                    return Ok(None);
                };

                let ring = RotationRing::new(tx.agent_seats(request.org_id, team_id)?);
                let Some(pick) = pick_agent(rule, &ring) else {
                    return Ok(None);
                };

                let rule_id = rule.map(AutoAssignRule::id);
                if let Some(cursor_rule) = rule_id.filter(|_| pick.advances_cursor) {
                    tx.save_cursor(cursor_rule, pick.seat.member_id)?;
                }
                tx.assign_ticket(request.ticket_id, team_id, pick.seat.user_id, now)?;

                Ok(Some(Assignment {
                    team_id,
                    assignee_id: pick.seat.user_id,
                    member_id: pick.seat.member_id,
                    rule_id,
                }))
            })
            .await?;

        if let Some(assignment) = &outcome {
            debug!(
                ticket_id = %request.ticket_id,
                assignee_id = %assignment.assignee_id,
                team_id = %assignment.team_id,
                "ticket auto-assigned"
            );
        }
        Ok(outcome)
    }
}
