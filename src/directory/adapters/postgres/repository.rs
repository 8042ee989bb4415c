//! `PostgreSQL` repository implementation for the organization directory.

use super::models::{MemberRow, NewTeamMemberRow, NewTeamRow, OrganizationRow};
use crate::directory::{
    domain::{Member, OrgSlug, Organization, PersistedOrganizationData, Team},
    ports::{DirectoryRepository, DirectoryRepositoryError, DirectoryRepositoryResult},
};
use crate::ids::{MemberId, OrgId, TeamId};
use crate::storage::postgres::schema::{members, organizations, team_members, teams};
use crate::storage::postgres::{
    PgPool, is_foreign_key_violation, run_blocking, to_signed, to_unsigned,
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed directory repository.
#[derive(Debug, Clone)]
pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    async fn store_organization(
        &self,
        organization: &Organization,
    ) -> DirectoryRepositoryResult<()> {
        let org_id = organization.id();
        let slug = organization.slug().clone();
        let row = to_organization_row(organization)?;

        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(organizations::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
                        if info.constraint_name() == Some("organizations_pkey") =>
                    {
                        DirectoryRepositoryError::DuplicateOrganization(org_id)
                    }
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        DirectoryRepositoryError::DuplicateSlug(slug.clone())
                    }
                    _ => DirectoryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_organization(
        &self,
        id: OrgId,
    ) -> DirectoryRepositoryResult<Option<Organization>> {
        run_blocking(&self.pool, move |connection| {
            let row = organizations::table
                .find(id.into_inner())
                .select(OrganizationRow::as_select())
                .first::<OrganizationRow>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?;
            row.map(row_to_organization).transpose()
        })
        .await
    }

    async fn list_organizations(&self) -> DirectoryRepositoryResult<Vec<Organization>> {
        run_blocking(&self.pool, move |connection| {
            let rows = organizations::table
                .order((organizations::created_at.asc(), organizations::id.asc()))
                .select(OrganizationRow::as_select())
                .load::<OrganizationRow>(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            rows.into_iter().map(row_to_organization).collect()
        })
        .await
    }

    async fn allocate_ticket_number(
        &self,
        id: OrgId,
    ) -> DirectoryRepositoryResult<(Organization, u64)> {
        run_blocking(&self.pool, move |connection| {
            let row = diesel::update(organizations::table.find(id.into_inner()))
                .set(organizations::next_ticket_number.eq(organizations::next_ticket_number + 1))
                .returning(OrganizationRow::as_returning())
                .get_result(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?
                .ok_or(DirectoryRepositoryError::OrganizationNotFound(id))?;
            let allocated = to_unsigned::<DirectoryRepositoryError>(row.next_ticket_number)?
                .saturating_sub(1);
            Ok((row_to_organization(row)?, allocated))
        })
        .await
    }

    async fn store_member(&self, member: &Member) -> DirectoryRepositoryResult<()> {
        let org_id = member.org_id();
        let row = MemberRow {
            id: member.id().into_inner(),
            org_id: org_id.into_inner(),
            user_id: member.user_id().into_inner(),
            role: member.role().as_str().to_owned(),
        };
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(members::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_org_reference(err, org_id))?;
            Ok(())
        })
        .await
    }

    async fn store_team(&self, team: &Team) -> DirectoryRepositoryResult<()> {
        let org_id = team.org_id();
        let row = NewTeamRow {
            id: team.id().into_inner(),
            org_id: org_id.into_inner(),
            name: team.name().to_owned(),
        };
        run_blocking(&self.pool, move |connection| {
            diesel::insert_into(teams::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_org_reference(err, org_id))?;
            Ok(())
        })
        .await
    }

    async fn add_team_member(
        &self,
        team_id: TeamId,
        member_id: MemberId,
    ) -> DirectoryRepositoryResult<()> {
        run_blocking(&self.pool, move |connection| {
            let team_org = teams::table
                .find(team_id.into_inner())
                .select(teams::org_id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?
                .ok_or(DirectoryRepositoryError::TeamNotFound(team_id))?;
            let member_org = members::table
                .find(member_id.into_inner())
                .select(members::org_id)
                .first::<uuid::Uuid>(connection)
                .optional()
                .map_err(DirectoryRepositoryError::persistence)?
                .ok_or(DirectoryRepositoryError::MemberNotFound(member_id))?;
            if team_org != member_org {
                return Err(DirectoryRepositoryError::CrossOrganizationMembership {
                    team_id,
                    member_id,
                });
            }

            diesel::insert_into(team_members::table)
                .values(&NewTeamMemberRow {
                    team_id: team_id.into_inner(),
                    member_id: member_id.into_inner(),
                })
                .on_conflict_do_nothing()
                .execute(connection)
                .map_err(DirectoryRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }
}

fn map_org_reference(err: DieselError, org_id: OrgId) -> DirectoryRepositoryError {
    if is_foreign_key_violation(&err) {
        DirectoryRepositoryError::OrganizationNotFound(org_id)
    } else {
        DirectoryRepositoryError::persistence(err)
    }
}

fn to_organization_row(organization: &Organization) -> DirectoryRepositoryResult<OrganizationRow> {
    Ok(OrganizationRow {
        id: organization.id().into_inner(),
        slug: organization.slug().as_str().to_owned(),
        name: organization.name().to_owned(),
        next_ticket_number: to_signed::<DirectoryRepositoryError>(organization.next_ticket_number())?,
        created_at: organization.created_at(),
    })
}

fn row_to_organization(row: OrganizationRow) -> DirectoryRepositoryResult<Organization> {
    let slug = OrgSlug::new(row.slug).map_err(DirectoryRepositoryError::persistence)?;
    Ok(Organization::from_persisted(PersistedOrganizationData {
        id: OrgId::from_uuid(row.id),
        slug,
        name: row.name,
        next_ticket_number: to_unsigned::<DirectoryRepositoryError>(row.next_ticket_number)?,
        created_at: row.created_at,
    }))
}
