//! Rotation ring of agents and the pure agent-picking step.

use super::{AssignmentStrategy, AutoAssignRule};
use crate::ids::{CategoryId, MemberId, OrgId, RuleId, TeamId, TicketId, UserId};
use serde::{Deserialize, Serialize};

/// An agent who can receive tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentSeat {
    /// Membership identifier; orders the ring.
    pub member_id: MemberId,
    /// User the ticket is assigned to.
    pub user_id: UserId,
}

/// Agent-role members of a team, ordered by membership identifier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RotationRing {
    seats: Vec<AgentSeat>,
}

impl RotationRing {
    /// Builds a ring, sorting by member id and dropping duplicates.
    #[must_use]
    pub fn new(mut seats: Vec<AgentSeat>) -> Self {
        seats.sort_by_key(|seat| seat.member_id);
        seats.dedup_by_key(|seat| seat.member_id);
        Self { seats }
    }

    /// Returns the seats in ring order.
    #[must_use]
    pub fn seats(&self) -> &[AgentSeat] {
        &self.seats
    }

    /// Returns `true` when the team has no agents.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Returns the first seat in ring order.
    #[must_use]
    pub fn first(&self) -> Option<&AgentSeat> {
        self.seats.first()
    }

    /// Returns the seat after `cursor`, wrapping around.
    ///
    /// A missing cursor, or one that no longer belongs to the ring, starts
    /// again from the first seat.
    #[must_use]
    pub fn after(&self, cursor: Option<MemberId>) -> Option<&AgentSeat> {
        cursor
            .and_then(|member_id| {
                self.seats
                    .iter()
                    .position(|seat| seat.member_id == member_id)
            })
            .and_then(|index| self.seats.get(index.saturating_add(1)))
            .or_else(|| self.first())
    }
}

/// Result of picking an agent from a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentPick {
    /// The chosen agent.
    pub seat: AgentSeat,
    /// The rule cursor must move to this agent.
    pub advances_cursor: bool,
}

/// Picks the agent for a ticket.
///
/// Round-robin applies only when a rule was chosen and uses that rule's
/// cursor. Everything else takes the first agent and leaves cursors alone.
/// Returns `None` for an empty ring.
#[must_use]
pub fn pick_agent(rule: Option<&AutoAssignRule>, ring: &RotationRing) -> Option<AgentPick> {
    match rule {
        Some(chosen) if chosen.strategy() == AssignmentStrategy::RoundRobin => {
            ring.after(chosen.last_assigned_member_id())
                .map(|seat| AgentPick {
                    seat: *seat,
                    advances_cursor: true,
                })
        }
        _ => ring.first().map(|seat| AgentPick {
            seat: *seat,
            advances_cursor: false,
        }),
    }
}

/// Input to the auto-assign resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentRequest {
    /// Organization of the ticket.
    pub org_id: OrgId,
    /// Ticket to assign.
    pub ticket_id: TicketId,
    /// Ticket category used for rule matching.
    pub category_id: Option<CategoryId>,
    /// Team used when the chosen rule has none, or no rule matches.
    pub fallback_team_id: Option<TeamId>,
}

/// Outcome of a successful auto-assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Team the ticket now belongs to.
    pub team_id: TeamId,
    /// Assigned agent.
    pub assignee_id: UserId,
    /// Membership of the assigned agent.
    pub member_id: MemberId,
    /// Rule that drove the assignment, if any.
    pub rule_id: Option<RuleId>,
}
