//! In-memory directory repository.

use crate::directory::{
    domain::{Member, Organization, Team},
    ports::{DirectoryRepository, DirectoryRepositoryError, DirectoryRepositoryResult},
};
use crate::ids::{MemberId, OrgId, TeamId};
use crate::storage::memory::InMemoryDatabase;
use async_trait::async_trait;

/// Thread-safe in-memory directory repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectoryRepository {
    db: InMemoryDatabase,
}

impl InMemoryDirectoryRepository {
    /// Creates a repository over the shared database.
    #[must_use]
    pub const fn new(db: InMemoryDatabase) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryDirectoryRepository {
    async fn store_organization(
        &self,
        organization: &Organization,
    ) -> DirectoryRepositoryResult<()> {
        let mut tables = self.db.write::<DirectoryRepositoryError>()?;
        if tables.organizations.contains_key(&organization.id()) {
            return Err(DirectoryRepositoryError::DuplicateOrganization(
                organization.id(),
            ));
        }
        if tables
            .organizations
            .values()
            .any(|existing| existing.slug() == organization.slug())
        {
            return Err(DirectoryRepositoryError::DuplicateSlug(
                organization.slug().clone(),
            ));
        }
        tables
            .organizations
            .insert(organization.id(), organization.clone());
        Ok(())
    }

    async fn find_organization(
        &self,
        id: OrgId,
    ) -> DirectoryRepositoryResult<Option<Organization>> {
        let tables = self.db.read::<DirectoryRepositoryError>()?;
        Ok(tables.organizations.get(&id).cloned())
    }

    async fn list_organizations(&self) -> DirectoryRepositoryResult<Vec<Organization>> {
        let tables = self.db.read::<DirectoryRepositoryError>()?;
        let mut organizations: Vec<Organization> = tables.organizations.values().cloned().collect();
        organizations.sort_by_key(|org| (org.created_at(), org.id()));
        Ok(organizations)
    }

    async fn allocate_ticket_number(
        &self,
        id: OrgId,
    ) -> DirectoryRepositoryResult<(Organization, u64)> {
        let mut tables = self.db.write::<DirectoryRepositoryError>()?;
        let organization = tables
            .organizations
            .get_mut(&id)
            .ok_or(DirectoryRepositoryError::OrganizationNotFound(id))?;
        let number = organization.allocate_ticket_number();
        Ok((organization.clone(), number))
    }

    async fn store_member(&self, member: &Member) -> DirectoryRepositoryResult<()> {
        let mut tables = self.db.write::<DirectoryRepositoryError>()?;
        if !tables.organizations.contains_key(&member.org_id()) {
            return Err(DirectoryRepositoryError::OrganizationNotFound(
                member.org_id(),
            ));
        }
        tables.members.insert(member.id(), member.clone());
        Ok(())
    }

    async fn store_team(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        let mut tables = self.db.write::<DirectoryRepositoryError>()?;
        if !tables.organizations.contains_key(&team.org_id()) {
            return Err(DirectoryRepositoryError::OrganizationNotFound(
                team.org_id(),
            ));
        }
        tables.teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn add_team_member(
        &self,
        team_id: TeamId,
        member_id: MemberId,
    ) -> DirectoryRepositoryResult<()> {
        let mut tables = self.db.write::<DirectoryRepositoryError>()?;
        let team_org = tables
            .teams
            .get(&team_id)
            .ok_or(DirectoryRepositoryError::TeamNotFound(team_id))?
            .org_id();
        let member_org = tables
            .members
            .get(&member_id)
            .ok_or(DirectoryRepositoryError::MemberNotFound(member_id))?
            .org_id();
        if team_org != member_org {
            return Err(DirectoryRepositoryError::CrossOrganizationMembership {
                team_id,
                member_id,
            });
        }
        tables.team_members.insert((team_id, member_id));
        Ok(())
    }
}
