//! A fully wired in-memory service desk.

use std::sync::Arc;

use super::{TestClock, reference_instant};
use chrono::TimeDelta;
use opsdesk::assignment::{
    adapters::memory::{InMemoryAssignmentStore, InMemoryAutoAssignRuleRepository},
    domain::{AssignmentStrategy, AutoAssignRule, NewAutoAssignRule},
    ports::AutoAssignRuleRepository,
    services::AutoAssignResolver,
};
use opsdesk::config::AutomationConfig;
use opsdesk::directory::{
    adapters::memory::InMemoryDirectoryRepository,
    domain::{Member, MemberRole, OrgSlug, Organization, Team},
    ports::DirectoryRepository,
};
use opsdesk::ids::{OrgId, TeamId, TicketId, UserId};
use opsdesk::jobs::services::JobRunner;
use opsdesk::ledger::adapters::memory::{InMemoryJobRunRepository, InMemoryWorkflowRunRepository};
use opsdesk::notification::{
    adapters::memory::{InMemoryAuditSink, InMemoryEmailOutbox, InMemoryNotificationSink},
    domain::{AuditEntry, Notification},
    ports::{AuditSink, NotificationSink},
};
use opsdesk::storage::memory::InMemoryDatabase;
use opsdesk::ticket::{
    adapters::memory::{InMemorySlaRuleRepository, InMemoryTicketRepository},
    domain::{SlaRule, Ticket, TicketPriority},
    ports::{SlaRuleRepository, TicketRepository},
    services::TicketIntakeService,
};
use opsdesk::workflow::services::{SlaScanService, WorkflowOrchestrator, WorkflowPorts};

/// Intake service over the in-memory adapters.
pub type DeskIntake = TicketIntakeService<
    InMemoryDirectoryRepository,
    InMemoryTicketRepository,
    InMemorySlaRuleRepository,
    TestClock,
>;

/// In-memory adapters sharing one database and one clock.
pub struct Desk {
    pub clock: TestClock,
    pub directory: Arc<InMemoryDirectoryRepository>,
    pub tickets: Arc<InMemoryTicketRepository>,
    pub sla_rules: Arc<InMemorySlaRuleRepository>,
    pub rules: Arc<InMemoryAutoAssignRuleRepository>,
    pub workflow_runs: Arc<InMemoryWorkflowRunRepository>,
    pub job_runs: Arc<InMemoryJobRunRepository>,
    pub notifications: Arc<InMemoryNotificationSink<TestClock>>,
    pub audit: Arc<InMemoryAuditSink>,
    pub outbox: Arc<InMemoryEmailOutbox>,
    resolver: Arc<AutoAssignResolver<InMemoryAssignmentStore, TestClock>>,
}

impl Desk {
    /// Creates an empty desk at [`reference_instant`].
    #[must_use]
    pub fn new() -> Self {
        let db = InMemoryDatabase::new();
        let clock = TestClock::at(reference_instant());
        let shared = Arc::new(clock.clone());
        Self {
            directory: Arc::new(InMemoryDirectoryRepository::new(db.clone())),
            tickets: Arc::new(InMemoryTicketRepository::new(db.clone())),
            sla_rules: Arc::new(InMemorySlaRuleRepository::new(db.clone())),
            rules: Arc::new(InMemoryAutoAssignRuleRepository::new(db.clone())),
            workflow_runs: Arc::new(InMemoryWorkflowRunRepository::new(db.clone())),
            job_runs: Arc::new(InMemoryJobRunRepository::new(db.clone())),
            notifications: Arc::new(InMemoryNotificationSink::new(
                db.clone(),
                Arc::clone(&shared),
            )),
            audit: Arc::new(InMemoryAuditSink::new(db.clone())),
            outbox: Arc::new(InMemoryEmailOutbox::new(db.clone())),
            resolver: Arc::new(AutoAssignResolver::new(
                Arc::new(InMemoryAssignmentStore::new(db)),
                shared,
            )),
            clock,
        }
    }

    /// Creates an organization, then moves the clock one second so later
    /// organizations sort after it.
    ///
    /// # Errors
    ///
    /// Returns an error when the slug is invalid or storage fails.
    pub async fn add_org(&self, slug: &str) -> eyre::Result<OrgId> {
        let organization = Organization::new(OrgSlug::new(slug)?, slug, &self.clock)?;
        self.directory.store_organization(&organization).await?;
        self.clock.advance(TimeDelta::seconds(1));
        Ok(organization.id())
    }

    /// Creates a team.
    ///
    /// # Errors
    ///
    /// Returns an error when the organization is unknown.
    pub async fn add_team(&self, org_id: OrgId, name: &str) -> eyre::Result<TeamId> {
        let team = Team::new(org_id, name)?;
        self.directory.store_team(&team).await?;
        Ok(team.id())
    }

    /// Adds an agent to `team_id` and returns their user id.
    ///
    /// # Errors
    ///
    /// Returns an error when the organization or team is unknown.
    pub async fn add_agent(&self, org_id: OrgId, team_id: TeamId) -> eyre::Result<UserId> {
        let user_id = UserId::new();
        let member = Member::new(org_id, user_id, MemberRole::Agent);
        self.directory.store_member(&member).await?;
        self.directory.add_team_member(team_id, member.id()).await?;
        Ok(user_id)
    }

    /// Stores an active rule matching every category.
    ///
    /// # Errors
    ///
    /// Returns an error when the rule cannot be stored.
    pub async fn add_rule(
        &self,
        org_id: OrgId,
        team_id: TeamId,
        strategy: AssignmentStrategy,
    ) -> eyre::Result<AutoAssignRule> {
        let rule = AutoAssignRule::new(
            NewAutoAssignRule {
                org_id,
                name: "Front line".to_owned(),
                category_id: None,
                team_id: Some(team_id),
                strategy,
            },
            &self.clock,
        )?;
        self.rules.store(&rule).await?;
        Ok(rule)
    }

    /// Sets the resolution target for a priority.
    ///
    /// # Errors
    ///
    /// Returns an error when the rule is invalid or cannot be stored.
    pub async fn add_sla_rule(
        &self,
        org_id: OrgId,
        priority: TicketPriority,
        resolution_minutes: u32,
    ) -> eyre::Result<()> {
        let rule = SlaRule::new(org_id, priority, 60, resolution_minutes)?;
        self.sla_rules.upsert(&rule).await?;
        Ok(())
    }

    /// Ticket intake over this desk.
    #[must_use]
    pub fn intake(&self) -> DeskIntake {
        TicketIntakeService::new(
            Arc::clone(&self.directory),
            Arc::clone(&self.tickets),
            Arc::clone(&self.sla_rules),
            Arc::new(self.clock.clone()),
        )
    }

    /// Workflow collaborators over this desk.
    #[must_use]
    pub fn ports(&self) -> WorkflowPorts {
        WorkflowPorts {
            directory: Arc::clone(&self.directory) as _,
            tickets: Arc::clone(&self.tickets) as _,
            resolver: Arc::clone(&self.resolver) as _,
            runs: Arc::clone(&self.workflow_runs) as _,
            notifications: Arc::clone(&self.notifications) as _,
            audit: Arc::clone(&self.audit) as _,
        }
    }

    /// Workflow orchestrator over this desk.
    #[must_use]
    pub fn orchestrator(&self) -> WorkflowOrchestrator<TestClock> {
        WorkflowOrchestrator::new(self.ports(), Arc::new(self.clock.clone()))
    }

    /// SLA sweep over this desk.
    #[must_use]
    pub fn sla_scan(&self) -> SlaScanService<TestClock> {
        SlaScanService::new(
            Arc::clone(&self.directory) as _,
            Arc::clone(&self.tickets) as _,
            Arc::clone(&self.notifications) as _,
            Arc::clone(&self.audit) as _,
            Arc::new(self.clock.clone()),
        )
    }

    /// Job runner over this desk with default limits.
    #[must_use]
    pub fn runner(&self) -> JobRunner<TestClock> {
        JobRunner::from_ports(
            self.ports(),
            Arc::clone(&self.job_runs) as _,
            Arc::clone(&self.outbox) as _,
            &Arc::new(self.clock.clone()),
            AutomationConfig::default(),
        )
    }

    /// Loads a ticket.
    ///
    /// # Errors
    ///
    /// Returns an error when the lookup fails or the ticket is missing.
    pub async fn ticket(&self, id: TicketId) -> eyre::Result<Ticket> {
        self.tickets
            .find_by_id(id)
            .await?
            .ok_or_else(|| eyre::eyre!("ticket {id} not found"))
    }

    /// Lists an organization's active tickets, least recently updated first.
    ///
    /// # Errors
    ///
    /// Returns an error when the read fails.
    pub async fn tickets_for(&self, org_id: OrgId) -> eyre::Result<Vec<Ticket>> {
        Ok(self.tickets.list_active(org_id, 1000).await?)
    }

    /// Lists a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error when the read fails.
    pub async fn notifications_for(
        &self,
        org_id: OrgId,
        user_id: UserId,
    ) -> eyre::Result<Vec<Notification>> {
        Ok(self
            .notifications
            .list_for_user(org_id, user_id, 100)
            .await?)
    }

    /// Lists the audit entries recorded for a ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error when the read fails.
    pub async fn audit_for(&self, ticket: &Ticket) -> eyre::Result<Vec<AuditEntry>> {
        Ok(self
            .audit
            .list_for_entity(ticket.org_id(), "Ticket", &ticket.id().to_string())
            .await?)
    }
}

impl Default for Desk {
    fn default() -> Self {
        Self::new()
    }
}
