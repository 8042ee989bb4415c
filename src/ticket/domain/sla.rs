//! SLA flag evaluation and SLA targets.
//!
//! [`evaluate_sla`] is the single source of truth for the at-risk and
//! breached flags. It is pure: callers pass the stored due date, the stored
//! first-breach timestamp, and the current time, then compare the result with
//! what is stored through [`SlaTransition`] to decide whether to persist and
//! whether to escalate.

use super::{TicketDomainError, TicketPriority};
use crate::ids::{OrgId, TicketId};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Time before the due date during which an unbreached ticket is at risk.
///
/// The comparison is strict: exactly four hours left is not at risk.
pub const AT_RISK_WINDOW: TimeDelta = TimeDelta::hours(4);

/// Derived SLA state of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlaFlags {
    /// The due date is less than [`AT_RISK_WINDOW`] away and not yet passed.
    pub at_risk: bool,
    /// When the ticket first went past its due date.
    pub breached_at: Option<DateTime<Utc>>,
}

impl SlaFlags {
    /// Returns `true` once a breach has been recorded.
    #[must_use]
    pub const fn is_breached(&self) -> bool {
        self.breached_at.is_some()
    }
}

/// Computes SLA flags for a due date at `now`.
///
/// - Without a due date nothing is at risk and `previous_breached_at` is
///   carried through.
/// - A ticket is breached when `now` is strictly after the due date. The
///   first breach timestamp is sticky: an existing `previous_breached_at` is
///   returned unchanged, otherwise `now` becomes the breach time.
/// - A ticket is at risk when it is not breached and less than
///   [`AT_RISK_WINDOW`] remains.
///
/// A breach timestamp is never cleared here. Clearing only happens through a
/// manual due-date edit.
#[must_use]
pub fn evaluate_sla(
    due_at: Option<DateTime<Utc>>,
    previous_breached_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> SlaFlags {
    let Some(due) = due_at else {
        return SlaFlags {
            at_risk: false,
            breached_at: previous_breached_at,
        };
    };

    let breached = now > due;
    let at_risk = !breached && due.signed_duration_since(now) < AT_RISK_WINDOW;
    let breached_at = if breached {
        Some(previous_breached_at.unwrap_or(now))
    } else {
        previous_breached_at
    };

    SlaFlags {
        at_risk,
        breached_at,
    }
}

/// Difference between stored and freshly evaluated SLA flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlaTransition {
    /// The flags differ and must be persisted.
    pub changed: bool,
    /// At-risk went from false to true.
    pub became_at_risk: bool,
    /// A breach was recorded for the first time.
    pub became_breached: bool,
}

impl SlaTransition {
    /// Compares stored flags with newly evaluated ones.
    #[must_use]
    pub fn between(previous: &SlaFlags, next: &SlaFlags) -> Self {
        Self {
            changed: previous != next,
            became_at_risk: !previous.at_risk && next.at_risk,
            became_breached: previous.breached_at.is_none() && next.breached_at.is_some(),
        }
    }
}

/// A scan's write of freshly evaluated SLA flags.
///
/// Stores only the flags and `updated_at`, and only while the stored ticket
/// is still active and still holds the due date and flags the evaluation
/// started from. Any other edit made since the ticket was loaded wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlaFlagUpdate {
    /// Ticket to update.
    pub ticket_id: TicketId,
    /// Due date the flags were evaluated against.
    pub due_at: Option<DateTime<Utc>>,
    /// Flags stored when the ticket was loaded.
    pub expected: SlaFlags,
    /// Newly evaluated flags.
    pub flags: SlaFlags,
    /// Evaluation time.
    pub updated_at: DateTime<Utc>,
}

/// Response and resolution targets for one priority in one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaRule {
    org_id: OrgId,
    priority: TicketPriority,
    response_minutes: u32,
    resolution_minutes: u32,
}

impl SlaRule {
    /// Creates an SLA rule.
    ///
    /// # Errors
    ///
    /// Returns [`TicketDomainError::InvalidSlaTarget`] when either target is
    /// zero.
    pub const fn new(
        org_id: OrgId,
        priority: TicketPriority,
        response_minutes: u32,
        resolution_minutes: u32,
    ) -> Result<Self, TicketDomainError> {
        if response_minutes == 0 {
            return Err(TicketDomainError::InvalidSlaTarget(response_minutes));
        }
        if resolution_minutes == 0 {
            return Err(TicketDomainError::InvalidSlaTarget(resolution_minutes));
        }
        Ok(Self {
            org_id,
            priority,
            response_minutes,
            resolution_minutes,
        })
    }

    /// Returns the organization identifier.
    #[must_use]
    pub const fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the priority the rule applies to.
    #[must_use]
    pub const fn priority(&self) -> TicketPriority {
        self.priority
    }

    /// Returns the first-response target in minutes.
    #[must_use]
    pub const fn response_minutes(&self) -> u32 {
        self.response_minutes
    }

    /// Returns the resolution target in minutes.
    #[must_use]
    pub const fn resolution_minutes(&self) -> u32 {
        self.resolution_minutes
    }

    /// Due date for a ticket opened at `start`.
    ///
    /// Returns `None` only if the result falls outside the representable
    /// date range.
    #[must_use]
    pub fn due_from(&self, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
        start.checked_add_signed(TimeDelta::minutes(i64::from(self.resolution_minutes)))
    }
}
