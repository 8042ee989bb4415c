//! Shared world state for SLA escalation BDD scenarios.

use crate::test_helpers::desk::Desk;
use opsdesk::ids::{OrgId, TicketId, UserId};
use opsdesk::workflow::{
    domain::RunResult,
    services::{OrgRunGuard, OrgRunPermit},
};
use rstest::fixture;

/// Scenario world for SLA escalation behaviour tests.
pub struct EscalationWorld {
    pub desk: Desk,
    pub guard: OrgRunGuard,
    pub org_id: Option<OrgId>,
    pub agent: Option<UserId>,
    pub ticket_id: Option<TicketId>,
    pub held_permit: Option<OrgRunPermit>,
    pub last_run: Option<RunResult>,
}

impl EscalationWorld {
    /// Creates an empty desk with no organization yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            desk: Desk::new(),
            guard: OrgRunGuard::new(),
            org_id: None,
            agent: None,
            ticket_id: None,
            held_permit: None,
            last_run: None,
        }
    }

    /// Returns the scenario organization.
    ///
    /// # Errors
    ///
    /// Returns an error when no organization was set up.
    pub fn org_id(&self) -> eyre::Result<OrgId> {
        self.org_id
            .ok_or_else(|| eyre::eyre!("missing organization in scenario world"))
    }

    /// Returns the scenario agent.
    ///
    /// # Errors
    ///
    /// Returns an error when no agent was set up.
    pub fn agent(&self) -> eyre::Result<UserId> {
        self.agent
            .ok_or_else(|| eyre::eyre!("missing agent in scenario world"))
    }

    /// Returns the scenario ticket.
    ///
    /// # Errors
    ///
    /// Returns an error when no ticket was opened.
    pub fn ticket_id(&self) -> eyre::Result<TicketId> {
        self.ticket_id
            .ok_or_else(|| eyre::eyre!("missing ticket in scenario world"))
    }
}

impl Default for EscalationWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> EscalationWorld {
    EscalationWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
