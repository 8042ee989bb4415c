//! Behaviour tests for SLA escalation and workflow automation.

mod sla_escalation_steps;
mod test_helpers;

use rstest_bdd_macros::scenario;
use sla_escalation_steps::world::{EscalationWorld, world};

#[scenario(
    path = "tests/features/sla_escalation.feature",
    name = "Unassigned critical ticket is assigned and escalated once"
)]
#[tokio::test(flavor = "multi_thread")]
async fn critical_ticket_is_escalated_once(world: EscalationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/sla_escalation.feature",
    name = "Rescheduling clears a recorded breach"
)]
#[tokio::test(flavor = "multi_thread")]
async fn rescheduling_clears_breach(world: EscalationWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/sla_escalation.feature",
    name = "Organization with a scan in flight is skipped"
)]
#[tokio::test(flavor = "multi_thread")]
async fn busy_organization_is_skipped(world: EscalationWorld) {
    let _ = world;
}
