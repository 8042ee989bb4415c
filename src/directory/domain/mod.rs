//! Domain model for organizations, memberships, and teams.

mod error;
mod member;
mod organization;

pub use error::{DirectoryDomainError, ParseMemberRoleError};
pub use member::{Member, MemberRole, Team};
pub use organization::{OrgSlug, Organization, PersistedOrganizationData};
