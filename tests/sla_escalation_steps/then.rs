//! Then steps for SLA escalation scenarios.

use super::world::{EscalationWorld, run_async};
use opsdesk::notification::domain::NotificationType;
use opsdesk::ticket::domain::Ticket;
use opsdesk::workflow::domain::{RunResult, RunStatus};
use rstest_bdd_macros::then;

fn ticket(world: &EscalationWorld) -> Result<Ticket, eyre::Report> {
    run_async(world.desk.ticket(world.ticket_id()?))
}

fn last_run(world: &EscalationWorld) -> Result<&RunResult, eyre::Report> {
    world
        .last_run
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing workflow run result in scenario world"))
}

#[then("the run succeeds")]
fn run_succeeds(world: &EscalationWorld) -> Result<(), eyre::Report> {
    let run = last_run(world)?;
    if run.status != RunStatus::Success {
        return Err(eyre::eyre!("expected success, got {}", run.message));
    }
    Ok(())
}

#[then("the run is skipped")]
fn run_is_skipped(world: &EscalationWorld) -> Result<(), eyre::Report> {
    let run = last_run(world)?;
    if run.status != RunStatus::Skipped || run.run_id.is_some() {
        return Err(eyre::eyre!("expected a skipped run, got {run:?}"));
    }
    Ok(())
}

#[then("the ticket is assigned to the agent")]
fn ticket_assigned(world: &EscalationWorld) -> Result<(), eyre::Report> {
    let assignee = ticket(world)?.assignee_id();
    if assignee != Some(world.agent()?) {
        return Err(eyre::eyre!("ticket assigned to {assignee:?}"));
    }
    Ok(())
}

#[then("the ticket is at risk")]
fn ticket_at_risk(world: &EscalationWorld) -> Result<(), eyre::Report> {
    let current = ticket(world)?;
    if !current.at_risk() || current.breached_at().is_some() {
        return Err(eyre::eyre!(
            "expected at risk without breach, got {:?}",
            current.sla_flags()
        ));
    }
    Ok(())
}

#[then("the ticket is breached")]
fn ticket_breached(world: &EscalationWorld) -> Result<(), eyre::Report> {
    if ticket(world)?.breached_at().is_none() {
        return Err(eyre::eyre!("expected a recorded breach"));
    }
    Ok(())
}

#[then("the ticket is neither at risk nor breached")]
fn ticket_clear(world: &EscalationWorld) -> Result<(), eyre::Report> {
    let current = ticket(world)?;
    if current.at_risk() || current.breached_at().is_some() {
        return Err(eyre::eyre!("expected clear flags, got {:?}", current.sla_flags()));
    }
    Ok(())
}

#[then(r#"the agent has {count:usize} "{kind}" notification"#)]
fn agent_notifications(
    world: &EscalationWorld,
    count: usize,
    kind: String,
) -> Result<(), eyre::Report> {
    let wanted = NotificationType::try_from(kind.as_str())?;
    let found = run_async(world.desk.notifications_for(world.org_id()?, world.agent()?))?
        .into_iter()
        .filter(|notification| notification.kind() == wanted)
        .count();
    if found != count {
        return Err(eyre::eyre!("expected {count} {kind} notification(s), found {found}"));
    }
    Ok(())
}

#[then("the breach is audited once")]
fn breach_audited_once(world: &EscalationWorld) -> Result<(), eyre::Report> {
    let current = ticket(world)?;
    let entries = run_async(world.desk.audit_for(&current))?;
    let breaches = entries
        .iter()
        .filter(|entry| entry.action() == "TICKET_SLA_BREACHED")
        .count();
    if breaches != 1 {
        return Err(eyre::eyre!("expected one breach audit entry, found {breaches}"));
    }
    Ok(())
}
