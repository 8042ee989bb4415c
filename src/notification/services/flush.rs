//! Email outbox flush with a logging delivery stub.

use crate::ids::{EmailId, OrgId};
use crate::notification::{
    domain::{FlushSummary, QueuedEmail},
    ports::{EmailOutbox, NotificationResult},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::info;

/// Marks pending emails sent and logs one delivery line per email.
#[derive(Clone)]
pub struct EmailFlushService<O, C>
where
    O: EmailOutbox + ?Sized,
    C: Clock + Send + Sync,
{
    outbox: Arc<O>,
    clock: Arc<C>,
}

impl<O, C> EmailFlushService<O, C>
where
    O: EmailOutbox + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a flush service.
    #[must_use]
    pub const fn new(outbox: Arc<O>, clock: Arc<C>) -> Self {
        Self { outbox, clock }
    }

    /// Flushes up to `limit` pending emails, oldest first.
    ///
    /// # Errors
    ///
    /// Returns the outbox error when reading or updating fails.
    pub async fn flush(
        &self,
        org_id: Option<OrgId>,
        limit: usize,
    ) -> NotificationResult<FlushSummary> {
        let pending = self.outbox.pending(org_id, limit).await?;
        if pending.is_empty() {
            return Ok(FlushSummary::default());
        }

        let ids: Vec<EmailId> = pending.iter().map(QueuedEmail::id).collect();
        let sent = self.outbox.mark_sent(&ids, self.clock.utc()).await?;
        for email in &pending {
            info!(
                org_id = %email.org_id(),
                to = email.to_email(),
                subject = email.subject(),
                email_id = %email.id(),
                "email delivery stub"
            );
        }
        Ok(FlushSummary {
            scanned: pending.len(),
            sent,
        })
    }
}
