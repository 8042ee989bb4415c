//! Ticket intake through the public API.

use crate::test_helpers::{desk::Desk, reference_instant};
use chrono::TimeDelta;
use mockable::Clock;
use opsdesk::ids::UserId;
use opsdesk::ticket::{
    domain::{TicketDomainError, TicketPriority, TicketStatus},
    services::{OpenTicketRequest, TicketIntakeError},
};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ticket_keys_are_sequential_per_organization() -> eyre::Result<()> {
    let desk = Desk::new();
    let acme = desk.add_org("acme").await?;
    let globex = desk.add_org("globex").await?;
    let intake = desk.intake();
    let requester = UserId::new();

    let first = intake
        .open_ticket(OpenTicketRequest::new(acme, requester, "VPN down"))
        .await?;
    let second = intake
        .open_ticket(OpenTicketRequest::new(acme, requester, "Printer jam"))
        .await?;
    let other = intake
        .open_ticket(OpenTicketRequest::new(globex, requester, "Laptop request"))
        .await?;

    eyre::ensure!(first.key().as_str() == "ACME-1", "got {}", first.key().as_str());
    eyre::ensure!(second.key().as_str() == "ACME-2", "got {}", second.key().as_str());
    eyre::ensure!(other.key().as_str() == "GLOBEX-1", "got {}", other.key().as_str());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn due_date_comes_from_the_priority_rule() -> eyre::Result<()> {
    let desk = Desk::new();
    let org_id = desk.add_org("acme").await?;
    desk.add_sla_rule(org_id, TicketPriority::High, 480).await?;
    let opened_at = desk.clock.utc();

    let ticket = desk
        .intake()
        .open_ticket(
            OpenTicketRequest::new(org_id, UserId::new(), "Mail bouncing")
                .with_priority(TicketPriority::High),
        )
        .await?;

    eyre::ensure!(ticket.due_at() == Some(opened_at + TimeDelta::minutes(480)));
    eyre::ensure!(!ticket.at_risk(), "eight hours out is not at risk");
    eyre::ensure!(ticket.status() == TicketStatus::Open);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn explicit_due_date_wins_and_is_flagged_at_open() -> eyre::Result<()> {
    let desk = Desk::new();
    let org_id = desk.add_org("acme").await?;
    desk.add_sla_rule(org_id, TicketPriority::Medium, 1440).await?;
    let due_at = reference_instant() + TimeDelta::hours(2);

    let ticket = desk
        .intake()
        .open_ticket(OpenTicketRequest::new(org_id, UserId::new(), "Disk full").with_due_at(due_at))
        .await?;

    eyre::ensure!(ticket.due_at() == Some(due_at));
    eyre::ensure!(ticket.at_risk(), "two hours out is inside the risk window");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn blank_title_is_rejected() -> eyre::Result<()> {
    let desk = Desk::new();
    let org_id = desk.add_org("acme").await?;

    let result = desk
        .intake()
        .open_ticket(OpenTicketRequest::new(org_id, UserId::new(), "   "))
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(TicketIntakeError::Domain(TicketDomainError::EmptyTitle))
        ),
        "expected an empty title error, got {result:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rescheduling_clears_a_recorded_breach() -> eyre::Result<()> {
    let desk = Desk::new();
    let org_id = desk.add_org("acme").await?;
    let intake = desk.intake();
    let ticket = intake
        .open_ticket(
            OpenTicketRequest::new(org_id, UserId::new(), "Badge reader")
                .with_due_at(reference_instant() + TimeDelta::minutes(30)),
        )
        .await?;
    desk.clock.advance(TimeDelta::hours(1));
    desk.sla_scan().run_sla_scan(Some(org_id), None).await?;
    eyre::ensure!(desk.ticket(ticket.id()).await?.breached_at().is_some());

    let rescheduled = intake
        .reschedule(ticket.id(), Some(desk.clock.utc() + TimeDelta::days(2)))
        .await?;

    eyre::ensure!(rescheduled.breached_at().is_none(), "breach should clear");
    eyre::ensure!(!rescheduled.at_risk());
    Ok(())
}
