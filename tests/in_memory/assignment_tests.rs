//! Rule-driven assignment during workflow scans.

use std::collections::HashSet;

use crate::test_helpers::desk::Desk;
use opsdesk::assignment::domain::AssignmentStrategy;
use opsdesk::ids::{OrgId, UserId};
use opsdesk::notification::domain::{Notification, NotificationType};
use opsdesk::ticket::services::OpenTicketRequest;
use opsdesk::workflow::domain::RunStatus;
use rstest::rstest;

async fn open_unassigned(desk: &Desk, org_id: OrgId, count: usize) -> eyre::Result<Vec<UserId>> {
    let intake = desk.intake();
    let mut requesters = Vec::with_capacity(count);
    for n in 0..count {
        let requester = UserId::new();
        intake
            .open_ticket(OpenTicketRequest::new(org_id, requester, format!("Request {n}")))
            .await?;
        requesters.push(requester);
    }
    Ok(requesters)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn round_robin_spreads_tickets_across_the_team() -> eyre::Result<()> {
    let desk = Desk::new();
    let org_id = desk.add_org("acme").await?;
    let team_id = desk.add_team(org_id, "Service Desk").await?;
    let first_agent = desk.add_agent(org_id, team_id).await?;
    let second_agent = desk.add_agent(org_id, team_id).await?;
    desk.add_rule(org_id, team_id, AssignmentStrategy::RoundRobin)
        .await?;
    open_unassigned(&desk, org_id, 4).await?;

    let result = desk.orchestrator().run_for_org(org_id, None).await;

    eyre::ensure!(result.status == RunStatus::Success, "{}", result.message);
    eyre::ensure!(result.counters.assigned_count == 4);
    for agent in [first_agent, second_agent] {
        let assigned = desk
            .notifications_for(org_id, agent)
            .await?
            .into_iter()
            .filter(|notification| notification.kind() == NotificationType::Assignment)
            .count();
        eyre::ensure!(assigned == 2, "agent got {assigned} assignments");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn team_default_always_picks_the_same_agent() -> eyre::Result<()> {
    let desk = Desk::new();
    let org_id = desk.add_org("acme").await?;
    let team_id = desk.add_team(org_id, "Field Support").await?;
    desk.add_agent(org_id, team_id).await?;
    desk.add_agent(org_id, team_id).await?;
    desk.add_rule(org_id, team_id, AssignmentStrategy::TeamDefault)
        .await?;
    open_unassigned(&desk, org_id, 3).await?;

    desk.orchestrator().run_for_org(org_id, None).await;

    let tickets = desk.tickets_for(org_id).await?;
    let assignees: HashSet<Option<UserId>> =
        tickets.iter().map(|ticket| ticket.assignee_id()).collect();
    eyre::ensure!(assignees.len() == 1, "expected one assignee, got {assignees:?}");
    eyre::ensure!(!assignees.contains(&None), "every ticket should be assigned");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn team_without_agents_leaves_tickets_unassigned() -> eyre::Result<()> {
    let desk = Desk::new();
    let org_id = desk.add_org("acme").await?;
    let team_id = desk.add_team(org_id, "Empty Team").await?;
    desk.add_rule(org_id, team_id, AssignmentStrategy::RoundRobin)
        .await?;
    open_unassigned(&desk, org_id, 2).await?;

    let result = desk.orchestrator().run_for_org(org_id, None).await;

    eyre::ensure!(result.status == RunStatus::Success, "{}", result.message);
    eyre::ensure!(result.counters.scanned == 2);
    eyre::ensure!(result.counters.assigned_count == 0);
    let tickets = desk.tickets_for(org_id).await?;
    eyre::ensure!(tickets.iter().all(|ticket| ticket.assignee_id().is_none()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn requester_is_told_about_the_assignment() -> eyre::Result<()> {
    let desk = Desk::new();
    let org_id = desk.add_org("acme").await?;
    let team_id = desk.add_team(org_id, "Service Desk").await?;
    desk.add_agent(org_id, team_id).await?;
    desk.add_rule(org_id, team_id, AssignmentStrategy::RoundRobin)
        .await?;
    let requesters = open_unassigned(&desk, org_id, 1).await?;
    let requester = requesters
        .first()
        .copied()
        .ok_or_else(|| eyre::eyre!("missing requester"))?;

    desk.orchestrator().run_for_org(org_id, None).await;

    let notifications = desk.notifications_for(org_id, requester).await?;
    let titles: Vec<&str> = notifications.iter().map(Notification::title).collect();
    eyre::ensure!(titles == ["Assigned: ACME-1"], "got {titles:?}");
    Ok(())
}
