//! Jobs, SLA escalation, and run ledgers end to end.

use std::sync::Arc;

use crate::test_helpers::desk::Desk;
use chrono::TimeDelta;
use mockable::Clock;
use opsdesk::assignment::domain::AssignmentStrategy;
use opsdesk::ids::UserId;
use opsdesk::jobs::{
    adapters::inline::InlineJobQueue,
    domain::{JobKind, JobRequest},
    services::JobScheduler,
};
use opsdesk::ledger::{
    domain::{JobRunStatus, WorkflowRunStatus, WorkflowRunType},
    ports::{JobRunRepository, WorkflowRunRepository},
};
use opsdesk::notification::{
    domain::{NotificationType, QueuedEmail},
    ports::EmailOutbox,
};
use opsdesk::ticket::{domain::TicketPriority, services::OpenTicketRequest};
use rstest::rstest;
use serde_json::json;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn critical_ticket_is_assigned_then_escalated_once() -> eyre::Result<()> {
    let desk = Desk::new();
    let org_id = desk.add_org("acme").await?;
    let team_id = desk.add_team(org_id, "Service Desk").await?;
    let agent = desk.add_agent(org_id, team_id).await?;
    desk.add_rule(org_id, team_id, AssignmentStrategy::RoundRobin)
        .await?;
    desk.add_sla_rule(org_id, TicketPriority::Critical, 240).await?;
    let ticket = desk
        .intake()
        .open_ticket(
            OpenTicketRequest::new(org_id, UserId::new(), "Payroll system down")
                .with_priority(TicketPriority::Critical),
        )
        .await?;
    let scheduler = JobScheduler::new(
        Arc::new(InlineJobQueue::new(Arc::new(desk.runner()))),
        Arc::new(desk.clock.clone()),
    );

    scheduler
        .enqueue(JobRequest::new(JobKind::WorkflowsRun))
        .await?;
    eyre::ensure!(desk.ticket(ticket.id()).await?.assignee_id() == Some(agent));

    eyre::ensure!(!desk.ticket(ticket.id()).await?.at_risk(), "four hours left is not at risk");

    desk.clock.advance(TimeDelta::minutes(1));
    scheduler.enqueue(JobRequest::new(JobKind::SlaScan)).await?;
    eyre::ensure!(desk.ticket(ticket.id()).await?.at_risk());

    for _ in 0..3 {
        desk.clock.advance(TimeDelta::minutes(120));
        scheduler.enqueue(JobRequest::new(JobKind::SlaScan)).await?;
    }

    let escalated = desk.ticket(ticket.id()).await?;
    eyre::ensure!(escalated.breached_at().is_some(), "ticket should be breached");
    let kinds: Vec<NotificationType> = desk
        .notifications_for(org_id, agent)
        .await?
        .iter()
        .map(|notification| notification.kind())
        .collect();
    eyre::ensure!(
        kinds
            == [
                NotificationType::SlaBreached,
                NotificationType::SlaAtRisk,
                NotificationType::Assignment,
            ],
        "unexpected notifications {kinds:?}"
    );
    let audit = desk.audit_for(&escalated).await?;
    eyre::ensure!(audit.len() == 1, "breach should be audited once");

    let runs = desk.job_runs.list_recent(None, 10).await?;
    eyre::ensure!(runs.len() == 5, "expected 5 job runs, got {}", runs.len());
    eyre::ensure!(runs.iter().all(|run| run.status() == JobRunStatus::Success));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scheduled_run_covers_every_org_oldest_first() -> eyre::Result<()> {
    let desk = Desk::new();
    let acme = desk.add_org("acme").await?;
    let globex = desk.add_org("globex").await?;

    let run = desk
        .runner()
        .run(JobRequest::new(JobKind::WorkflowsRun))
        .await?;

    let org_ids: Vec<&serde_json::Value> = run
        .result()
        .and_then(|result| result.get("orgs"))
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| eyre::eyre!("result should list orgs"))?
        .iter()
        .filter_map(|org| org.get("orgId"))
        .collect();
    eyre::ensure!(
        org_ids == [&json!(acme.to_string()), &json!(globex.to_string())],
        "unexpected order {org_ids:?}"
    );

    for org_id in [acme, globex] {
        let workflow_runs = desk.workflow_runs.list_recent(Some(org_id), 10).await?;
        let recorded = workflow_runs
            .first()
            .ok_or_else(|| eyre::eyre!("missing workflow run for {org_id}"))?;
        eyre::ensure!(recorded.run_type() == WorkflowRunType::Scheduled);
        eyre::ensure!(recorded.status() == WorkflowRunStatus::Completed);
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn flush_job_drains_only_the_scoped_org() -> eyre::Result<()> {
    let desk = Desk::new();
    let acme = desk.add_org("acme").await?;
    let globex = desk.add_org("globex").await?;
    for org_id in [acme, globex] {
        let email = QueuedEmail::new(
            org_id,
            "oncall@example.test",
            "SLA breached",
            "A ticket breached its SLA",
            desk.clock.utc(),
        );
        desk.outbox.queue(&email).await?;
    }

    let run = desk
        .runner()
        .run(JobRequest::new(JobKind::NotificationsFlush).for_org(acme))
        .await?;

    eyre::ensure!(run.message() == Some("Flushed 1 email(s)"));
    let remaining = desk.outbox.pending(None, 10).await?;
    eyre::ensure!(remaining.len() == 1);
    eyre::ensure!(remaining.iter().all(|email| email.org_id() == globex));
    Ok(())
}
