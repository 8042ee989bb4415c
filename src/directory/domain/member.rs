//! Organization members, roles, and teams.

use super::{DirectoryDomainError, ParseMemberRoleError};
use crate::ids::{MemberId, OrgId, TeamId, UserId};
use serde::{Deserialize, Serialize};

/// Role a user holds inside an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Organization administrator.
    OrgAdmin,
    /// Support agent; the only role eligible for auto-assignment.
    Agent,
    /// End user raising tickets.
    Requester,
    /// Read-only observer.
    ReadOnly,
}

impl MemberRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrgAdmin => "org_admin",
            Self::Agent => "agent",
            Self::Requester => "requester",
            Self::ReadOnly => "read_only",
        }
    }
}

impl TryFrom<&str> for MemberRole {
    type Error = ParseMemberRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "org_admin" => Ok(Self::OrgAdmin),
            "agent" => Ok(Self::Agent),
            "requester" => Ok(Self::Requester),
            "read_only" => Ok(Self::ReadOnly),
            _ => Err(ParseMemberRoleError(value.to_owned())),
        }
    }
}

/// A user's membership in an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    id: MemberId,
    org_id: OrgId,
    user_id: UserId,
    role: MemberRole,
}

impl Member {
    /// Creates a membership with a fresh identifier.
    #[must_use]
    pub fn new(org_id: OrgId, user_id: UserId, role: MemberRole) -> Self {
        Self::from_parts(MemberId::new(), org_id, user_id, role)
    }

    /// Builds a membership from known parts, typically persisted rows.
    #[must_use]
    pub const fn from_parts(
        id: MemberId,
        org_id: OrgId,
        user_id: UserId,
        role: MemberRole,
    ) -> Self {
        Self {
            id,
            org_id,
            user_id,
            role,
        }
    }

    /// Returns the membership identifier.
    #[must_use]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the organization identifier.
    #[must_use]
    pub const fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the member's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the member's role.
    #[must_use]
    pub const fn role(&self) -> MemberRole {
        self.role
    }

    /// Returns `true` when the member can receive auto-assigned tickets.
    #[must_use]
    pub const fn is_agent(&self) -> bool {
        matches!(self.role, MemberRole::Agent)
    }
}

/// A team of members within an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    org_id: OrgId,
    name: String,
}

impl Team {
    /// Creates a team with a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryDomainError::EmptyTeamName`] when the name is blank.
    pub fn new(org_id: OrgId, name: impl Into<String>) -> Result<Self, DirectoryDomainError> {
        let trimmed = name.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(DirectoryDomainError::EmptyTeamName);
        }
        Ok(Self::from_parts(TeamId::new(), org_id, trimmed))
    }

    /// Builds a team from known parts, typically persisted rows.
    #[must_use]
    pub const fn from_parts(id: TeamId, org_id: OrgId, name: String) -> Self {
        Self { id, org_id, name }
    }

    /// Returns the team identifier.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the organization identifier.
    #[must_use]
    pub const fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the team name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
