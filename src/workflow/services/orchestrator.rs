//! Per-organization workflow scans.

use crate::assignment::{
    domain::AssignmentRequest,
    services::{AssignmentError, AssignmentResolver},
};
use crate::directory::ports::{DirectoryRepository, DirectoryRepositoryError};
use crate::ids::{OrgId, UserId};
use crate::ledger::{
    domain::{LedgerDomainError, WorkflowRun, WorkflowRunType},
    ports::{LedgerStoreError, WorkflowRunRepository},
};
use crate::notification::ports::{AuditSink, NotificationSink, NotificationStoreError};
use crate::ticket::{
    domain::Ticket,
    ports::{TicketRepository, TicketRepositoryError},
};
use crate::workflow::{
    domain::{RunCounters, RunResult, WorkflowBatchResult},
    services::{Escalations, OrgRunGuard},
};
use mockable::Clock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Active tickets loaded per organization scan unless configured otherwise.
pub const DEFAULT_WORKFLOW_SCAN_LIMIT: usize = 500;

/// Errors that stop a workflow scan.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Organization lookup failed.
    #[error(transparent)]
    Directory(#[from] DirectoryRepositoryError),
    /// Ticket read or write failed.
    #[error(transparent)]
    Tickets(#[from] TicketRepositoryError),
    /// Auto-assignment failed.
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    /// Notification or audit write failed.
    #[error(transparent)]
    Notifications(#[from] NotificationStoreError),
    /// Workflow run record write failed.
    #[error(transparent)]
    Runs(#[from] LedgerStoreError),
    /// Workflow run lifecycle violated.
    #[error(transparent)]
    RunLifecycle(#[from] LedgerDomainError),
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Collaborators used by workflow scans.
#[derive(Clone)]
pub struct WorkflowPorts {
    /// Organization directory.
    pub directory: Arc<dyn DirectoryRepository>,
    /// Ticket store.
    pub tickets: Arc<dyn TicketRepository>,
    /// Auto-assignment resolver.
    pub resolver: Arc<dyn AssignmentResolver>,
    /// Workflow run records.
    pub runs: Arc<dyn WorkflowRunRepository>,
    /// In-app notification sink.
    pub notifications: Arc<dyn NotificationSink>,
    /// Audit trail.
    pub audit: Arc<dyn AuditSink>,
}

/// Runs the workflow automation for one organization or all of them.
///
/// Tickets are processed sequentially, least recently updated first. For
/// each ticket the orchestrator:
/// 1. auto-assigns it when it has no assignee,
/// 2. refreshes its SLA flags and saves them when they changed,
/// 3. escalates a newly at-risk or newly breached ticket exactly once.
///
/// A per-ticket error stops the organization's scan. Tickets saved before
/// the error keep their updates, and the run is recorded as failed with
/// the partial counts.
#[derive(Clone)]
pub struct WorkflowOrchestrator<C>
where
    C: Clock + Send + Sync,
{
    ports: WorkflowPorts,
    escalations: Escalations,
    guard: OrgRunGuard,
    clock: Arc<C>,
    scan_limit: usize,
}

impl<C> WorkflowOrchestrator<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator with the default scan limit and its own
    /// single-flight guard.
    #[must_use]
    pub fn new(ports: WorkflowPorts, clock: Arc<C>) -> Self {
        let escalations = Escalations::new(
            Arc::clone(&ports.notifications),
            Arc::clone(&ports.audit),
        );
        Self {
            ports,
            escalations,
            guard: OrgRunGuard::new(),
            clock,
            scan_limit: DEFAULT_WORKFLOW_SCAN_LIMIT,
        }
    }

    /// Sets the number of active tickets loaded per organization.
    #[must_use]
    pub const fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = scan_limit;
        self
    }

    /// Shares a single-flight guard with other orchestrators.
    #[must_use]
    pub fn with_guard(mut self, guard: OrgRunGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Scans one organization on demand.
    ///
    /// Never fails: a run that cannot be recorded, or a scan that stops at
    /// an error, is reported as a failed [`RunResult`].
    pub async fn run_for_org(&self, org_id: OrgId, triggered_by: Option<UserId>) -> RunResult {
        self.run_org(org_id, WorkflowRunType::Manual, triggered_by)
            .await
    }

    /// Scans every organization, oldest first, isolating failures per
    /// organization.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Directory`] when the organizations cannot be
    /// listed.
    pub async fn run_for_all_orgs(
        &self,
        triggered_by: Option<UserId>,
    ) -> WorkflowResult<WorkflowBatchResult> {
        let organizations = self.ports.directory.list_organizations().await?;
        let mut results = Vec::with_capacity(organizations.len());
        for organization in &organizations {
            results.push(
                self.run_org(organization.id(), WorkflowRunType::Scheduled, triggered_by)
                    .await,
            );
        }

        let batch = WorkflowBatchResult::from_results(results);
        info!(
            orgs = batch.results.len(),
            failed_orgs = batch.failed_orgs,
            "workflow batch {}",
            batch.message
        );
        Ok(batch)
    }

    async fn run_org(
        &self,
        org_id: OrgId,
        run_type: WorkflowRunType,
        triggered_by: Option<UserId>,
    ) -> RunResult {
        let Some(_permit) = self.guard.try_acquire(org_id) else {
            warn!(%org_id, "workflow scan already in flight; skipping");
            return RunResult::skipped(org_id);
        };

        let mut run = WorkflowRun::start(Some(org_id), run_type, triggered_by, &*self.clock);
        if let Err(err) = self.ports.runs.create(&run).await {
            warn!(%org_id, error = %err, "workflow run could not be recorded");
            return RunResult::failed(
                org_id,
                None,
                format!("Workflow run create failed: {err}"),
                RunCounters::default(),
            );
        }

        let mut counters = RunCounters::default();
        let scanned = self.scan(org_id, triggered_by, &mut counters).await;
        if let Err(err) = scanned {
            let message = err.to_string();
            warn!(%org_id, run_id = %run.id(), error = %message, "workflow scan failed");
            self.close_run(&mut run, counters.failure_summary(&message), true)
                .await;
            return RunResult::failed(
                org_id,
                Some(run.id()),
                format!("Workflow automation failed: {message}"),
                counters,
            );
        }

        self.close_run(&mut run, counters.summary(), false).await;
        info!(
            %org_id,
            run_id = %run.id(),
            scanned = counters.scanned,
            assigned = counters.assigned_count,
            at_risk = counters.at_risk_escalations,
            breached = counters.breached_escalations,
            "workflow scan completed"
        );
        RunResult::succeeded(org_id, run.id(), counters)
    }

    async fn scan(
        &self,
        org_id: OrgId,
        triggered_by: Option<UserId>,
        counters: &mut RunCounters,
    ) -> WorkflowResult<()> {
        let tickets = self
            .ports
            .tickets
            .list_active(org_id, self.scan_limit)
            .await?;
        counters.scanned = tickets.len();
        for ticket in tickets {
            self.process_ticket(ticket, triggered_by, counters).await?;
        }
        Ok(())
    }

    async fn process_ticket(
        &self,
        ticket: Ticket,
        triggered_by: Option<UserId>,
        counters: &mut RunCounters,
    ) -> WorkflowResult<()> {
        let mut current = ticket;
        if current.assignee_id().is_none() {
            let request = AssignmentRequest {
                org_id: current.org_id(),
                ticket_id: current.id(),
                category_id: current.category_id(),
                fallback_team_id: current.team_id(),
            };
            if let Some(assignment) = self.ports.resolver.resolve(request).await? {
                counters.assigned_count += 1;
                current = self
                    .ports
                    .tickets
                    .find_by_id(current.id())
                    .await?
                    .unwrap_or(current);
                self.escalations
                    .assigned(&current, assignment.assignee_id)
                    .await?;
            }
        }

        let loaded_flags = current.sla_flags();
        let transition = current.refresh_sla(&*self.clock);
        if !transition.changed {
            return Ok(());
        }
        let update = current.sla_flag_update(loaded_flags);
        let Some(stored) = self.ports.tickets.update_sla_flags(&update).await? else {
            debug!(ticket_id = %current.id(), "ticket changed during the scan; skipped");
            return Ok(());
        };
        if transition.became_at_risk {
            counters.at_risk_escalations += 1;
            self.escalations.at_risk(&stored).await?;
        }
        if transition.became_breached {
            counters.breached_escalations += 1;
            self.escalations
                .breached(&stored, triggered_by, self.clock.utc())
                .await?;
        }
        Ok(())
    }

    async fn close_run(&self, run: &mut WorkflowRun, summary: Value, failed: bool) {
        if let Err(err) = self.finish(run, summary, failed).await {
            error!(run_id = %run.id(), error = %err, "workflow run outcome could not be recorded");
        }
    }

    async fn finish(&self, run: &mut WorkflowRun, summary: Value, failed: bool) -> WorkflowResult<()> {
        if failed {
            run.fail(summary, &*self.clock)?;
        } else {
            run.complete(summary, &*self.clock)?;
        }
        self.ports.runs.finish(run).await?;
        Ok(())
    }
}
