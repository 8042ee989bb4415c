//! When steps for SLA escalation scenarios.

use super::world::{EscalationWorld, run_async};
use chrono::TimeDelta;
use eyre::WrapErr;
use mockable::Clock;
use rstest_bdd_macros::when;

#[when("the workflow automation runs")]
fn workflow_runs(world: &mut EscalationWorld) -> Result<(), eyre::Report> {
    let org_id = world.org_id()?;
    let orchestrator = world.desk.orchestrator().with_guard(world.guard.clone());
    world.last_run = Some(run_async(orchestrator.run_for_org(org_id, None)));
    Ok(())
}

#[when("{minutes:i64} minutes pass and the SLA scan runs")]
fn time_passes_then_scan(world: &mut EscalationWorld, minutes: i64) -> Result<(), eyre::Report> {
    let org_id = world.org_id()?;
    world.desk.clock.advance(TimeDelta::minutes(minutes));
    run_async(world.desk.sla_scan().run_sla_scan(Some(org_id), None))
        .wrap_err("run SLA scan")?;
    Ok(())
}

#[when("the ticket is rescheduled {days:i64} days out")]
fn ticket_rescheduled(world: &mut EscalationWorld, days: i64) -> Result<(), eyre::Report> {
    let ticket_id = world.ticket_id()?;
    let due_at = world.desk.clock.utc() + TimeDelta::days(days);
    run_async(world.desk.intake().reschedule(ticket_id, Some(due_at)))
        .wrap_err("reschedule ticket")?;
    Ok(())
}
