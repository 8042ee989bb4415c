//! Given steps for SLA escalation scenarios.

use super::world::{EscalationWorld, run_async};
use eyre::WrapErr;
use opsdesk::assignment::domain::AssignmentStrategy;
use opsdesk::ids::UserId;
use opsdesk::ticket::{domain::TicketPriority, services::OpenTicketRequest};
use rstest_bdd_macros::given;

#[given(r#"an organization "{slug}" with one agent on a round-robin team"#)]
fn organization_with_agent(world: &mut EscalationWorld, slug: String) -> Result<(), eyre::Report> {
    let desk = &world.desk;
    let (org_id, agent) = run_async(async {
        let org_id = desk.add_org(&slug).await?;
        let team_id = desk.add_team(org_id, "Service Desk").await?;
        let agent = desk.add_agent(org_id, team_id).await?;
        desk.add_rule(org_id, team_id, AssignmentStrategy::RoundRobin)
            .await?;
        Ok::<_, eyre::Report>((org_id, agent))
    })
    .wrap_err("set up organization with an agent")?;

    world.org_id = Some(org_id);
    world.agent = Some(agent);
    Ok(())
}

#[given("critical tickets must be resolved within {minutes:u32} minutes")]
fn critical_resolution_target(
    world: &mut EscalationWorld,
    minutes: u32,
) -> Result<(), eyre::Report> {
    let org_id = world.org_id()?;
    run_async(
        world
            .desk
            .add_sla_rule(org_id, TicketPriority::Critical, minutes),
    )
    .wrap_err("store critical SLA rule")
}

#[given(r#"an unassigned critical ticket "{title}""#)]
fn unassigned_critical_ticket(
    world: &mut EscalationWorld,
    title: String,
) -> Result<(), eyre::Report> {
    let request = OpenTicketRequest::new(world.org_id()?, UserId::new(), title)
        .with_priority(TicketPriority::Critical);
    let ticket = run_async(world.desk.intake().open_ticket(request)).wrap_err("open ticket")?;

    world.ticket_id = Some(ticket.id());
    Ok(())
}

#[given("a workflow run is already in flight for the organization")]
fn run_in_flight(world: &mut EscalationWorld) -> Result<(), eyre::Report> {
    let permit = world
        .guard
        .try_acquire(world.org_id()?)
        .ok_or_else(|| eyre::eyre!("organization is already claimed"))?;
    world.held_permit = Some(permit);
    Ok(())
}
