//! SLA-only sweep without auto-assignment.

use crate::directory::ports::DirectoryRepository;
use crate::ids::{OrgId, UserId};
use crate::notification::ports::{AuditSink, NotificationSink};
use crate::ticket::ports::TicketRepository;
use crate::workflow::{
    domain::ScanSummary,
    services::{Escalations, WorkflowResult},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tickets with a due date loaded per organization unless configured
/// otherwise.
pub const DEFAULT_SLA_SCAN_LIMIT: usize = 2000;

/// Refreshes SLA flags and escalates transitions, earliest due first.
///
/// Breach audit entries are attributed to the user who triggered the
/// scan. A failing organization yields a failed [`ScanSummary`] and the
/// sweep moves on.
#[derive(Clone)]
pub struct SlaScanService<C>
where
    C: Clock + Send + Sync,
{
    directory: Arc<dyn DirectoryRepository>,
    tickets: Arc<dyn TicketRepository>,
    escalations: Escalations,
    clock: Arc<C>,
    scan_limit: usize,
}

impl<C> SlaScanService<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a scan service with the default scan limit.
    #[must_use]
    pub const fn new(
        directory: Arc<dyn DirectoryRepository>,
        tickets: Arc<dyn TicketRepository>,
        notifications: Arc<dyn NotificationSink>,
        audit: Arc<dyn AuditSink>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            directory,
            tickets,
            escalations: Escalations::new(notifications, audit),
            clock,
            scan_limit: DEFAULT_SLA_SCAN_LIMIT,
        }
    }

    /// Sets the number of tickets loaded per organization.
    #[must_use]
    pub const fn with_scan_limit(mut self, scan_limit: usize) -> Self {
        self.scan_limit = scan_limit;
        self
    }

    /// Scans one organization, or every organization oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`super::WorkflowError::Directory`] when the organizations
    /// cannot be listed.
    pub async fn run_sla_scan(
        &self,
        org_id: Option<OrgId>,
        triggered_by: Option<UserId>,
    ) -> WorkflowResult<Vec<ScanSummary>> {
        let org_ids = match org_id {
            Some(id) => vec![id],
            None => self
                .directory
                .list_organizations()
                .await?
                .iter()
                .map(|organization| organization.id())
                .collect(),
        };

        let mut summaries = Vec::with_capacity(org_ids.len());
        for id in org_ids {
            summaries.push(self.scan_org(id, triggered_by).await);
        }
        Ok(summaries)
    }

    async fn scan_org(&self, org_id: OrgId, triggered_by: Option<UserId>) -> ScanSummary {
        let mut summary = ScanSummary::new(org_id);
        if let Err(err) = self.scan_tickets(&mut summary, triggered_by).await {
            let message = err.to_string();
            warn!(%org_id, error = %message, "SLA scan failed");
            return summary.into_failed(message);
        }
        info!(
            %org_id,
            scanned = summary.scanned,
            updated = summary.updated_count,
            at_risk = summary.at_risk_count,
            breached = summary.breach_count,
            "SLA scan completed"
        );
        summary
    }

    async fn scan_tickets(
        &self,
        summary: &mut ScanSummary,
        triggered_by: Option<UserId>,
    ) -> WorkflowResult<()> {
        let tickets = self
            .tickets
            .list_active_with_due(summary.org_id, self.scan_limit)
            .await?;
        summary.scanned = tickets.len();

        for mut ticket in tickets {
            let loaded_flags = ticket.sla_flags();
            let transition = ticket.refresh_sla(&*self.clock);
            if !transition.changed {
                continue;
            }
            let update = ticket.sla_flag_update(loaded_flags);
            let Some(stored) = self.tickets.update_sla_flags(&update).await? else {
                debug!(ticket_id = %ticket.id(), "ticket changed during the scan; skipped");
                continue;
            };
            summary.updated_count += 1;

            if transition.became_at_risk {
                summary.at_risk_count += 1;
                self.escalations.at_risk(&stored).await?;
            }
            if transition.became_breached {
                summary.breach_count += 1;
                self.escalations
                    .breached(&stored, triggered_by, self.clock.utc())
                    .await?;
            }
        }
        Ok(())
    }
}
