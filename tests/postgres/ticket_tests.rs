//! Ticket persistence against `PostgreSQL`.

use super::helpers::PgDesk;
use chrono::TimeDelta;
use mockable::Clock;
use opsdesk::ids::UserId;
use opsdesk::ticket::{
    domain::{SlaFlagUpdate, SlaFlags, TicketPriority, TicketStatus},
    ports::TicketRepository,
    services::OpenTicketRequest,
};

#[tokio::test(flavor = "multi_thread")]
async fn opened_tickets_round_trip_with_their_key() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;
    desk.add_sla_rule(organization.id(), TicketPriority::High, 480)
        .await?;
    let requester = UserId::new();

    let ticket = desk
        .intake()
        .open_ticket(
            OpenTicketRequest::new(organization.id(), requester, "Mail bouncing")
                .with_description("External senders get a 550")
                .with_priority(TicketPriority::High),
        )
        .await?;
    let found = desk
        .tickets
        .find_by_id(ticket.id())
        .await?
        .ok_or_else(|| eyre::eyre!("ticket missing"))?;

    let expected_key = format!("{}-1", organization.slug().key_prefix());
    eyre::ensure!(found.key().as_str() == expected_key, "got {}", found.key().as_str());
    eyre::ensure!(found.title() == "Mail bouncing");
    eyre::ensure!(found.description() == "External senders get a 550");
    eyre::ensure!(found.priority() == TicketPriority::High);
    eyre::ensure!(found.requester_id() == requester);
    eyre::ensure!(found.due_at() == ticket.due_at());
    eyre::ensure!(found.watchers() == [requester]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn watchers_and_status_changes_persist() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;
    let intake = desk.intake();
    let ticket = intake
        .open_ticket(OpenTicketRequest::new(organization.id(), UserId::new(), "VPN down"))
        .await?;
    let watcher = UserId::new();

    intake.watch(ticket.id(), watcher).await?;
    intake.change_status(ticket.id(), TicketStatus::Resolved).await?;
    let found = desk
        .tickets
        .find_by_id(ticket.id())
        .await?
        .ok_or_else(|| eyre::eyre!("ticket missing"))?;

    eyre::ensure!(found.watchers().contains(&watcher));
    eyre::ensure!(found.status() == TicketStatus::Resolved);
    eyre::ensure!(found.resolved_at().is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn sla_scan_query_lists_active_tickets_with_a_due_date_earliest_first() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;
    let org_id = organization.id();
    let intake = desk.intake();
    let now = desk.clock.utc();
    let later = intake
        .open_ticket(
            OpenTicketRequest::new(org_id, UserId::new(), "Later")
                .with_due_at(now + TimeDelta::hours(10)),
        )
        .await?;
    let sooner = intake
        .open_ticket(
            OpenTicketRequest::new(org_id, UserId::new(), "Sooner")
                .with_due_at(now + TimeDelta::hours(2)),
        )
        .await?;
    intake
        .open_ticket(OpenTicketRequest::new(org_id, UserId::new(), "No target"))
        .await?;
    let resolved = intake
        .open_ticket(
            OpenTicketRequest::new(org_id, UserId::new(), "Done")
                .with_due_at(now + TimeDelta::hours(1)),
        )
        .await?;
    intake.change_status(resolved.id(), TicketStatus::Resolved).await?;

    let listed = desk.tickets.list_active_with_due(org_id, 10).await?;
    let ids: Vec<_> = listed.iter().map(opsdesk::ticket::domain::Ticket::id).collect();

    eyre::ensure!(ids == vec![sooner.id(), later.id()], "got {ids:?}");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn sla_flag_write_only_lands_on_unchanged_active_tickets() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;
    let intake = desk.intake();
    let due_at = desk.clock.utc() + TimeDelta::hours(5);
    let open = intake
        .open_ticket(
            OpenTicketRequest::new(organization.id(), UserId::new(), "Scanner offline")
                .with_due_at(due_at),
        )
        .await?;
    let resolved = intake
        .open_ticket(
            OpenTicketRequest::new(organization.id(), UserId::new(), "Toner low")
                .with_due_at(due_at),
        )
        .await?;
    let watcher = UserId::new();
    intake.watch(open.id(), watcher).await?;
    intake
        .change_status(resolved.id(), TicketStatus::Resolved)
        .await?;
    let flag = |ticket_id| SlaFlagUpdate {
        ticket_id,
        due_at: Some(due_at),
        expected: SlaFlags::default(),
        flags: SlaFlags {
            at_risk: true,
            breached_at: None,
        },
        updated_at: desk.clock.utc(),
    };

    let written = desk
        .tickets
        .update_sla_flags(&flag(open.id()))
        .await?
        .ok_or_else(|| eyre::eyre!("active ticket should take the flags"))?;
    let skipped = desk.tickets.update_sla_flags(&flag(resolved.id())).await?;
    let stale = desk.tickets.update_sla_flags(&flag(open.id())).await?;

    eyre::ensure!(written.at_risk());
    eyre::ensure!(written.watchers().contains(&watcher));
    eyre::ensure!(skipped.is_none());
    eyre::ensure!(stale.is_none(), "flags already moved on");
    let untouched = desk
        .tickets
        .find_by_id(resolved.id())
        .await?
        .ok_or_else(|| eyre::eyre!("ticket missing"))?;
    eyre::ensure!(untouched.status() == TicketStatus::Resolved);
    eyre::ensure!(!untouched.at_risk());
    Ok(())
}
