//! Tests for the email outbox flush.

use std::sync::Arc;

use crate::directory::{
    adapters::memory::InMemoryDirectoryRepository,
    domain::{OrgSlug, Organization},
    ports::DirectoryRepository,
};
use crate::ids::OrgId;
use crate::notification::{
    adapters::memory::InMemoryEmailOutbox,
    domain::{EmailStatus, FlushSummary, QueuedEmail},
    ports::{EmailOutbox, NotificationStoreError},
    services::EmailFlushService,
};
use crate::storage::memory::InMemoryDatabase;
use crate::test_support::{ManualClock, reference_instant};
use chrono::TimeDelta;
use mockable::Clock;
use rstest::{fixture, rstest};

struct Harness {
    db: InMemoryDatabase,
    clock: ManualClock,
    orgs: [OrgId; 2],
    outbox: Arc<InMemoryEmailOutbox>,
    service: EmailFlushService<InMemoryEmailOutbox, ManualClock>,
}

impl Harness {
    async fn queue(&self, org_id: OrgId, subject: &str) -> QueuedEmail {
        let email = QueuedEmail::new(
            org_id,
            "agent@example.com",
            subject,
            "body",
            self.clock.utc(),
        );
        self.outbox.queue(&email).await.expect("queue should succeed");
        self.clock.advance(TimeDelta::seconds(1));
        email
    }
}

#[fixture]
async fn harness() -> Harness {
    let db = InMemoryDatabase::new();
    let clock = ManualClock::at(reference_instant());
    let directory = InMemoryDirectoryRepository::new(db.clone());
    let mut orgs = Vec::new();
    for slug in ["acme", "globex"] {
        let org = Organization::new(OrgSlug::new(slug).expect("valid slug"), slug, &clock)
            .expect("valid organization");
        directory
            .store_organization(&org)
            .await
            .expect("organization should be stored");
        orgs.push(org.id());
    }
    let outbox = Arc::new(InMemoryEmailOutbox::new(db.clone()));
    Harness {
        db,
        service: EmailFlushService::new(Arc::clone(&outbox), Arc::new(clock.clone())),
        orgs: orgs.try_into().expect("two organizations"),
        clock,
        outbox,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn flush_marks_oldest_pending_emails_sent(#[future(awt)] harness: Harness) {
    let [acme, _] = harness.orgs;
    let oldest = harness.queue(acme, "one").await;
    harness.queue(acme, "two").await;
    let newest = harness.queue(acme, "three").await;

    let summary = harness
        .service
        .flush(Some(acme), 2)
        .await
        .expect("flush should succeed");

    assert_eq!(summary, FlushSummary { scanned: 2, sent: 2 });
    let pending = harness
        .outbox
        .pending(Some(acme), 10)
        .await
        .expect("listing should succeed");
    let remaining: Vec<_> = pending.iter().map(QueuedEmail::id).collect();
    assert_eq!(remaining, vec![newest.id()]);
    assert!(!remaining.contains(&oldest.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn flush_without_organization_covers_every_tenant(#[future(awt)] harness: Harness) {
    let [acme, globex] = harness.orgs;
    harness.queue(acme, "one").await;
    harness.queue(globex, "two").await;

    let summary = harness
        .service
        .flush(None, 100)
        .await
        .expect("flush should succeed");
    let again = harness
        .service
        .flush(None, 100)
        .await
        .expect("second flush should succeed");

    assert_eq!(summary, FlushSummary { scanned: 2, sent: 2 });
    assert_eq!(again, FlushSummary::default());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn flushed_email_records_attempt_and_time(#[future(awt)] harness: Harness) {
    let [acme, _] = harness.orgs;
    let email = harness.queue(acme, "one").await;
    let flushed_at = harness.clock.utc();

    harness
        .service
        .flush(Some(acme), 10)
        .await
        .expect("flush should succeed");

    let tables = harness
        .db
        .read::<NotificationStoreError>()
        .expect("database should be readable");
    let stored = tables
        .email_queue
        .iter()
        .find(|queued| queued.id() == email.id())
        .expect("email should be stored");
    assert_eq!(stored.status(), EmailStatus::Sent);
    assert_eq!(stored.attempts(), 1);
    assert_eq!(stored.sent_at(), Some(flushed_at));
}
