//! Diesel row models for directory persistence.

use crate::storage::postgres::schema::{members, organizations, team_members, teams};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query and insert row for organizations.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrganizationRow {
    /// Organization identifier.
    pub id: uuid::Uuid,
    /// Organization slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Next ticket number.
    pub next_ticket_number: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Query and insert row for memberships.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MemberRow {
    /// Membership identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub org_id: uuid::Uuid,
    /// Platform user.
    pub user_id: uuid::Uuid,
    /// Membership role.
    pub role: String,
}

/// Insert row for teams.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = teams)]
pub struct NewTeamRow {
    /// Team identifier.
    pub id: uuid::Uuid,
    /// Owning organization.
    pub org_id: uuid::Uuid,
    /// Team name.
    pub name: String,
}

/// Insert row for team membership.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = team_members)]
pub struct NewTeamMemberRow {
    /// Team identifier.
    pub team_id: uuid::Uuid,
    /// Membership identifier.
    pub member_id: uuid::Uuid,
}
