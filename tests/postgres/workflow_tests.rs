//! Workflow automation against `PostgreSQL`.

use super::helpers::PgDesk;
use chrono::TimeDelta;
use opsdesk::assignment::{domain::AssignmentRequest, ports::AutoAssignRuleRepository};
use opsdesk::ids::UserId;
use opsdesk::ledger::{domain::WorkflowRunStatus, ports::WorkflowRunRepository};
use opsdesk::notification::{
    domain::NotificationType,
    ports::{AuditSink, NotificationSink},
};
use opsdesk::ticket::{domain::TicketPriority, ports::TicketRepository, services::OpenTicketRequest};
use opsdesk::workflow::domain::RunStatus;

#[tokio::test(flavor = "multi_thread")]
async fn round_robin_cursor_survives_between_scans() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;
    let org_id = organization.id();
    let team_id = desk.add_team(org_id).await?;
    let first_agent = desk.add_agent(org_id, team_id).await?;
    let second_agent = desk.add_agent(org_id, team_id).await?;
    let rule = desk.add_rule(org_id, team_id).await?;
    let intake = desk.intake();

    let first = intake
        .open_ticket(OpenTicketRequest::new(org_id, UserId::new(), "Laptop"))
        .await?;
    let first_run = desk.orchestrator().run_for_org(org_id, None).await;
    desk.clock.advance(TimeDelta::minutes(1));
    let second = intake
        .open_ticket(OpenTicketRequest::new(org_id, UserId::new(), "Monitor"))
        .await?;
    let second_run = desk.orchestrator().run_for_org(org_id, None).await;

    eyre::ensure!(first_run.status == RunStatus::Success, "{}", first_run.message);
    eyre::ensure!(second_run.status == RunStatus::Success, "{}", second_run.message);
    let assignees = [
        desk.tickets.find_by_id(first.id()).await?.and_then(|ticket| ticket.assignee_id()),
        desk.tickets.find_by_id(second.id()).await?.and_then(|ticket| ticket.assignee_id()),
    ];
    let mut picked: Vec<UserId> = assignees.iter().flatten().copied().collect();
    picked.sort();
    let mut agents = vec![first_agent, second_agent];
    agents.sort();
    eyre::ensure!(picked == agents, "each agent takes one ticket, got {assignees:?}");

    let stored = desk
        .rules
        .find_by_id(rule.id())
        .await?
        .ok_or_else(|| eyre::eyre!("rule missing"))?;
    eyre::ensure!(stored.last_assigned_member_id().is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_resolves_take_turns_on_the_rule_cursor() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;
    let org_id = organization.id();
    let team_id = desk.add_team(org_id).await?;
    let mut agents = vec![
        desk.add_agent(org_id, team_id).await?,
        desk.add_agent(org_id, team_id).await?,
        desk.add_agent(org_id, team_id).await?,
    ];
    let rule = desk.add_rule(org_id, team_id).await?;
    let intake = desk.intake();
    let mut requests = Vec::new();
    for number in 1..=6 {
        let title = format!("Ticket {number}");
        let ticket = intake
            .open_ticket(OpenTicketRequest::new(org_id, UserId::new(), title))
            .await?;
        requests.push(AssignmentRequest {
            org_id,
            ticket_id: ticket.id(),
            category_id: None,
            fallback_team_id: None,
        });
    }

    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let resolver = desk.resolver();
            tokio::spawn(async move { resolver.resolve(request).await })
        })
        .collect();
    let mut assignments = Vec::new();
    for handle in handles {
        let assignment = handle
            .await??
            .ok_or_else(|| eyre::eyre!("an agent should be picked"))?;
        assignments.push(assignment);
    }

    let mut picked: Vec<UserId> = assignments.iter().map(|found| found.assignee_id).collect();
    picked.sort();
    agents.sort();
    let expected: Vec<UserId> = agents.iter().flat_map(|agent| [*agent, *agent]).collect();
    eyre::ensure!(picked == expected, "each agent takes two tickets, got {picked:?}");
    let ring_end = assignments.iter().map(|found| found.member_id).max();
    let stored = desk
        .rules
        .find_by_id(rule.id())
        .await?
        .ok_or_else(|| eyre::eyre!("rule missing"))?;
    eyre::ensure!(
        stored.last_assigned_member_id() == ring_end,
        "two full laps end on the last seat, got {:?}",
        stored.last_assigned_member_id()
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn overdue_ticket_is_escalated_and_the_run_recorded() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;
    let org_id = organization.id();
    let team_id = desk.add_team(org_id).await?;
    let agent = desk.add_agent(org_id, team_id).await?;
    desk.add_rule(org_id, team_id).await?;
    desk.add_sla_rule(org_id, TicketPriority::Critical, 60).await?;
    let ticket = desk
        .intake()
        .open_ticket(
            OpenTicketRequest::new(org_id, UserId::new(), "Core switch down")
                .with_priority(TicketPriority::Critical),
        )
        .await?;
    desk.clock.advance(TimeDelta::minutes(61));

    let result = desk.orchestrator().run_for_org(org_id, None).await;

    eyre::ensure!(result.status == RunStatus::Success, "{}", result.message);
    eyre::ensure!(result.counters.assigned_count == 1);
    eyre::ensure!(result.counters.breached_escalations == 1);
    let run_id = result.run_id.ok_or_else(|| eyre::eyre!("run id missing"))?;
    let run = desk
        .workflow_runs
        .find_by_id(run_id)
        .await?
        .ok_or_else(|| eyre::eyre!("run missing"))?;
    eyre::ensure!(run.status() == WorkflowRunStatus::Completed);
    eyre::ensure!(run.finished_at().is_some());

    let stored = desk
        .tickets
        .find_by_id(ticket.id())
        .await?
        .ok_or_else(|| eyre::eyre!("ticket missing"))?;
    eyre::ensure!(stored.assignee_id() == Some(agent));
    eyre::ensure!(stored.breached_at().is_some());

    let kinds: Vec<NotificationType> = desk
        .notifications
        .list_for_user(org_id, agent, 10)
        .await?
        .iter()
        .map(|notification| notification.kind())
        .collect();
    eyre::ensure!(
        kinds.contains(&NotificationType::SlaBreached)
            && kinds.contains(&NotificationType::Assignment),
        "got {kinds:?}"
    );
    let audit = desk
        .audit
        .list_for_entity(org_id, "Ticket", &ticket.id().to_string())
        .await?;
    eyre::ensure!(audit.len() == 1, "breach audited once, got {}", audit.len());

    let rerun = desk.orchestrator().run_for_org(org_id, None).await;
    eyre::ensure!(rerun.counters.breached_escalations == 0);
    Ok(())
}
