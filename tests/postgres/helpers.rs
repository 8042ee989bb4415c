//! Shared helpers for `PostgreSQL` integration tests.

use std::sync::{Arc, OnceLock};

use crate::test_helpers::{TestClock, reference_instant};
use diesel::connection::SimpleConnection;
use opsdesk::assignment::{
    adapters::postgres::{PostgresAssignmentStore, PostgresAutoAssignRuleRepository},
    domain::{AssignmentStrategy, AutoAssignRule, NewAutoAssignRule},
    ports::AutoAssignRuleRepository,
    services::{AssignmentResolver, AutoAssignResolver},
};
use opsdesk::config::AutomationConfig;
use opsdesk::directory::{
    adapters::postgres::PostgresDirectoryRepository,
    domain::{Member, MemberRole, OrgSlug, Organization, Team},
    ports::DirectoryRepository,
};
use opsdesk::ids::{OrgId, TeamId, UserId};
use opsdesk::jobs::services::JobRunner;
use opsdesk::ledger::adapters::postgres::{PostgresJobRunRepository, PostgresWorkflowRunRepository};
use opsdesk::notification::adapters::postgres::{
    PostgresAuditSink, PostgresEmailOutbox, PostgresNotificationSink,
};
use opsdesk::storage::postgres::{PgPool, build_pool};
use opsdesk::ticket::{
    adapters::postgres::{PostgresSlaRuleRepository, PostgresTicketRepository},
    domain::{SlaRule, TicketPriority},
    ports::SlaRuleRepository,
    services::TicketIntakeService,
};
use opsdesk::workflow::services::{WorkflowOrchestrator, WorkflowPorts};
use uuid::Uuid;

/// Environment variable naming the disposable test database.
pub const TEST_DATABASE_URL_ENV: &str = "OPSDESK_TEST_DATABASE_URL";

const MIGRATION_UP: &str =
    include_str!("../../migrations/2026-03-01-000000_create_service_desk_tables/up.sql");
const MIGRATION_DOWN: &str =
    include_str!("../../migrations/2026-03-01-000000_create_service_desk_tables/down.sql");

static SCHEMA: OnceLock<Result<(), String>> = OnceLock::new();

/// Intake service over the `PostgreSQL` adapters.
pub type PgIntake = TicketIntakeService<
    PostgresDirectoryRepository,
    PostgresTicketRepository,
    PostgresSlaRuleRepository,
    TestClock,
>;

/// `PostgreSQL` adapters sharing one pool and one clock.
pub struct PgDesk {
    pub clock: TestClock,
    pub directory: Arc<PostgresDirectoryRepository>,
    pub tickets: Arc<PostgresTicketRepository>,
    pub sla_rules: Arc<PostgresSlaRuleRepository>,
    pub rules: Arc<PostgresAutoAssignRuleRepository>,
    pub workflow_runs: Arc<PostgresWorkflowRunRepository>,
    pub job_runs: Arc<PostgresJobRunRepository>,
    pub notifications: Arc<PostgresNotificationSink<TestClock>>,
    pub audit: Arc<PostgresAuditSink>,
    pub outbox: Arc<PostgresEmailOutbox>,
    resolver: Arc<AutoAssignResolver<PostgresAssignmentStore, TestClock>>,
}

impl PgDesk {
    /// Connects to the test database, resetting the schema on first use.
    ///
    /// Returns `None` when no test database is configured.
    ///
    /// # Errors
    ///
    /// Returns an error when the pool cannot be built or the schema reset
    /// fails.
    pub fn connect() -> eyre::Result<Option<Self>> {
        let Ok(url) = std::env::var(TEST_DATABASE_URL_ENV) else {
            return Ok(None);
        };
        let pool = build_pool(&url, 4)?;
        SCHEMA
            .get_or_init(|| reset_schema(&pool).map_err(|err| err.to_string()))
            .clone()
            .map_err(|err| eyre::eyre!("schema reset failed: {err}"))?;
        Ok(Some(Self::wire(&pool)))
    }

    fn wire(pool: &PgPool) -> Self {
        let clock = TestClock::at(reference_instant());
        let shared = Arc::new(clock.clone());
        Self {
            directory: Arc::new(PostgresDirectoryRepository::new(pool.clone())),
            tickets: Arc::new(PostgresTicketRepository::new(pool.clone())),
            sla_rules: Arc::new(PostgresSlaRuleRepository::new(pool.clone())),
            rules: Arc::new(PostgresAutoAssignRuleRepository::new(pool.clone())),
            workflow_runs: Arc::new(PostgresWorkflowRunRepository::new(pool.clone())),
            job_runs: Arc::new(PostgresJobRunRepository::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationSink::new(
                pool.clone(),
                Arc::clone(&shared),
            )),
            audit: Arc::new(PostgresAuditSink::new(pool.clone())),
            outbox: Arc::new(PostgresEmailOutbox::new(pool.clone())),
            resolver: Arc::new(AutoAssignResolver::new(
                Arc::new(PostgresAssignmentStore::new(pool.clone())),
                shared,
            )),
            clock,
        }
    }

    /// Creates an organization with a unique slug.
    ///
    /// # Errors
    ///
    /// Returns an error when storage fails.
    pub async fn add_org(&self) -> eyre::Result<Organization> {
        let slug = OrgSlug::new(format!("t-{}", Uuid::new_v4().simple()))?;
        let organization = Organization::new(slug, "Test Org", &self.clock)?;
        self.directory.store_organization(&organization).await?;
        Ok(organization)
    }

    /// Creates a team.
    ///
    /// # Errors
    ///
    /// Returns an error when storage fails.
    pub async fn add_team(&self, org_id: OrgId) -> eyre::Result<TeamId> {
        let team = Team::new(org_id, "Service Desk")?;
        self.directory.store_team(&team).await?;
        Ok(team.id())
    }

    /// Adds an agent to a team.
    ///
    /// # Errors
    ///
    /// Returns an error when storage fails.
    pub async fn add_agent(&self, org_id: OrgId, team_id: TeamId) -> eyre::Result<UserId> {
        let user_id = UserId::new();
        let member = Member::new(org_id, user_id, MemberRole::Agent);
        self.directory.store_member(&member).await?;
        self.directory.add_team_member(team_id, member.id()).await?;
        Ok(user_id)
    }

    /// Stores a round-robin rule matching every category.
    ///
    /// # Errors
    ///
    /// Returns an error when storage fails.
    pub async fn add_rule(&self, org_id: OrgId, team_id: TeamId) -> eyre::Result<AutoAssignRule> {
        let rule = AutoAssignRule::new(
            NewAutoAssignRule {
                org_id,
                name: "Rotation".to_owned(),
                category_id: None,
                team_id: Some(team_id),
                strategy: AssignmentStrategy::RoundRobin,
            },
            &self.clock,
        )?;
        self.rules.store(&rule).await?;
        Ok(rule)
    }

    /// Sets a resolution target.
    ///
    /// # Errors
    ///
    /// Returns an error when storage fails.
    pub async fn add_sla_rule(
        &self,
        org_id: OrgId,
        priority: TicketPriority,
        resolution_minutes: u32,
    ) -> eyre::Result<()> {
        self.sla_rules
            .upsert(&SlaRule::new(org_id, priority, 30, resolution_minutes)?)
            .await?;
        Ok(())
    }

    /// Ticket intake over the database.
    #[must_use]
    pub fn intake(&self) -> PgIntake {
        TicketIntakeService::new(
            Arc::clone(&self.directory),
            Arc::clone(&self.tickets),
            Arc::clone(&self.sla_rules),
            Arc::new(self.clock.clone()),
        )
    }

    /// Auto-assign resolver over the database.
    #[must_use]
    pub fn resolver(&self) -> Arc<dyn AssignmentResolver> {
        Arc::clone(&self.resolver) as _
    }

    /// Workflow collaborators over the database.
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

    /// Workflow orchestrator over the database.
    #[must_use]
    pub fn orchestrator(&self) -> WorkflowOrchestrator<TestClock> {
        WorkflowOrchestrator::new(self.ports(), Arc::new(self.clock.clone()))
    }

    /// Job runner over the database.
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
}

fn reset_schema(pool: &PgPool) -> eyre::Result<()> {
    let mut connection = pool.get()?;
    connection.batch_execute(MIGRATION_DOWN)?;
    connection.batch_execute(MIGRATION_UP)?;
    Ok(())
}
