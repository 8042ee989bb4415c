//! Repository port for organizations, memberships, and teams.

use crate::directory::domain::{Member, OrgSlug, Organization, Team};
use crate::ids::{MemberId, OrgId, TeamId};
use crate::storage::PersistenceError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory repository operations.
pub type DirectoryRepositoryResult<T> = Result<T, DirectoryRepositoryError>;

/// Organization directory persistence contract.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Stores a new organization.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::DuplicateOrganization`] when the
    /// identifier exists or [`DirectoryRepositoryError::DuplicateSlug`] when
    /// another organization already uses the slug.
    async fn store_organization(&self, organization: &Organization)
    -> DirectoryRepositoryResult<()>;

    /// Finds an organization by identifier.
    async fn find_organization(&self, id: OrgId)
    -> DirectoryRepositoryResult<Option<Organization>>;

    /// Lists every organization, oldest first.
    async fn list_organizations(&self) -> DirectoryRepositoryResult<Vec<Organization>>;

    /// Allocates the organization's next sequential ticket number.
    ///
    /// Returns the organization together with the allocated number so the
    /// caller can build the ticket key without a second lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::OrganizationNotFound`] when the
    /// organization does not exist.
    async fn allocate_ticket_number(
        &self,
        id: OrgId,
    ) -> DirectoryRepositoryResult<(Organization, u64)>;

    /// Stores a membership.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::OrganizationNotFound`] when the
    /// organization does not exist.
    async fn store_member(&self, member: &Member) -> DirectoryRepositoryResult<()>;

    /// Stores a team.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::OrganizationNotFound`] when the
    /// organization does not exist.
    async fn store_team(&self, team: &Team) -> DirectoryRepositoryResult<()>;

    /// Adds a member to a team. Adding an existing pair is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryRepositoryError::TeamNotFound`],
    /// [`DirectoryRepositoryError::MemberNotFound`], or
    /// [`DirectoryRepositoryError::CrossOrganizationMembership`] when the team
    /// and member do not belong to the same organization.
    async fn add_team_member(
        &self,
        team_id: TeamId,
        member_id: MemberId,
    ) -> DirectoryRepositoryResult<()>;
}

/// Errors returned by directory repository implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryRepositoryError {
    /// An organization with the same identifier already exists.
    #[error("duplicate organization identifier: {0}")]
    DuplicateOrganization(OrgId),

    /// Another organization already uses the slug.
    #[error("duplicate organization slug: {0}")]
    DuplicateSlug(OrgSlug),

    /// The organization was not found.
    #[error("organization not found: {0}")]
    OrganizationNotFound(OrgId),

    /// The team was not found.
    #[error("team not found: {0}")]
    TeamNotFound(TeamId),

    /// The member was not found.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// The team and member belong to different organizations.
    #[error("member {member_id} does not belong to the organization of team {team_id}")]
    CrossOrganizationMembership {
        /// Team being joined.
        team_id: TeamId,
        /// Member being added.
        member_id: MemberId,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl PersistenceError for DirectoryRepositoryError {
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}
