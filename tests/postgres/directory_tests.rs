//! Directory persistence against `PostgreSQL`.

use super::helpers::PgDesk;
use opsdesk::directory::{
    domain::{OrgSlug, Organization},
    ports::{DirectoryRepository, DirectoryRepositoryError},
};
use opsdesk::ids::OrgId;

#[tokio::test(flavor = "multi_thread")]
async fn ticket_numbers_are_allocated_in_sequence() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;

    let (_, first) = desk.directory.allocate_ticket_number(organization.id()).await?;
    let (_, second) = desk.directory.allocate_ticket_number(organization.id()).await?;
    let (stored, third) = desk.directory.allocate_ticket_number(organization.id()).await?;

    eyre::ensure!((first, second, third) == (1, 2, 3), "got {first}, {second}, {third}");
    eyre::ensure!(stored.slug() == organization.slug());
    eyre::ensure!(stored.next_ticket_number() == 4);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn allocating_for_an_unknown_organization_fails() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let missing = OrgId::new();

    let result = desk.directory.allocate_ticket_number(missing).await;

    eyre::ensure!(
        matches!(result, Err(DirectoryRepositoryError::OrganizationNotFound(id)) if id == missing),
        "expected OrganizationNotFound, got {result:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn a_taken_slug_is_rejected() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;
    let copycat = Organization::new(
        OrgSlug::new(organization.slug().as_str())?,
        "Copycat",
        &desk.clock,
    )?;

    let result = desk.directory.store_organization(&copycat).await;

    eyre::ensure!(
        matches!(result, Err(DirectoryRepositoryError::DuplicateSlug(_))),
        "expected DuplicateSlug, got {result:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn organizations_round_trip() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;

    let found = desk
        .directory
        .find_organization(organization.id())
        .await?
        .ok_or_else(|| eyre::eyre!("organization missing"))?;

    eyre::ensure!(found.slug() == organization.slug());
    eyre::ensure!(found.name() == organization.name());
    eyre::ensure!(found.created_at() == organization.created_at());
    eyre::ensure!(found.next_ticket_number() == 1);
    Ok(())
}
