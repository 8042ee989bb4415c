//! Ticket status and priority enumerations.

use super::{ParseTicketPriorityError, ParseTicketStatusError};
use serde::{Deserialize, Serialize};

/// Ticket lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Newly raised, not yet picked up.
    Open,
    /// An agent is working on it.
    InProgress,
    /// Waiting on the requester or a third party.
    OnHold,
    /// Fixed, awaiting confirmation.
    Resolved,
    /// Done.
    Closed,
}

impl TicketStatus {
    /// Statuses that automation scans.
    pub const ACTIVE: [Self; 3] = [Self::Open, Self::InProgress, Self::OnHold];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::OnHold => "on_hold",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    /// Returns `true` for Open, `InProgress`, and `OnHold`.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::InProgress | Self::OnHold)
    }
}

impl TryFrom<&str> for TicketStatus {
    type Error = ParseTicketStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "on_hold" => Ok(Self::OnHold),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(ParseTicketStatusError(value.to_owned())),
        }
    }
}

/// Ticket priority; selects the SLA rule at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    /// Low impact.
    Low,
    /// Normal impact.
    Medium,
    /// High impact.
    High,
    /// Service down.
    Critical,
}

impl TicketPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl TryFrom<&str> for TicketPriority {
    type Error = ParseTicketPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseTicketPriorityError(value.to_owned())),
        }
    }
}
