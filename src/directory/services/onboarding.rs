//! Service layer for provisioning organizations, members, and teams.

use crate::directory::{
    domain::{DirectoryDomainError, Member, MemberRole, OrgSlug, Organization, Team},
    ports::{DirectoryRepository, DirectoryRepositoryError},
};
use crate::ids::{MemberId, OrgId, TeamId, UserId};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors for directory provisioning.
#[derive(Debug, Error)]
pub enum DirectoryServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] DirectoryDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] DirectoryRepositoryError),
}

/// Result type for directory service operations.
pub type DirectoryServiceResult<T> = Result<T, DirectoryServiceError>;

/// Provisions the directory records that automation reads.
#[derive(Clone)]
pub struct DirectoryService<R, C>
where
    R: DirectoryRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> DirectoryService<R, C>
where
    R: DirectoryRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new directory service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates an organization.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError`] when the slug or name is invalid or
    /// the slug is already taken.
    pub async fn create_organization(
        &self,
        slug: &str,
        name: &str,
    ) -> DirectoryServiceResult<Organization> {
        let organization = Organization::new(OrgSlug::new(slug)?, name, &*self.clock)?;
        self.repository.store_organization(&organization).await?;
        Ok(organization)
    }

    /// Adds a user to an organization with the given role.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::Repository`] when the organization is
    /// unknown or persistence fails.
    pub async fn add_member(
        &self,
        org_id: OrgId,
        user_id: UserId,
        role: MemberRole,
    ) -> DirectoryServiceResult<Member> {
        let member = Member::new(org_id, user_id, role);
        self.repository.store_member(&member).await?;
        Ok(member)
    }

    /// Creates a team.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError`] when the name is blank or the
    /// organization is unknown.
    pub async fn create_team(&self, org_id: OrgId, name: &str) -> DirectoryServiceResult<Team> {
        let team = Team::new(org_id, name)?;
        self.repository.store_team(&team).await?;
        Ok(team)
    }

    /// Adds a member to a team.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryServiceError::Repository`] when either side is
    /// unknown or they belong to different organizations.
    pub async fn join_team(
        &self,
        team_id: TeamId,
        member_id: MemberId,
    ) -> DirectoryServiceResult<()> {
        self.repository.add_team_member(team_id, member_id).await?;
        Ok(())
    }
}
