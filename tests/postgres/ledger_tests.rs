//! Job and workflow run records against `PostgreSQL`.

use super::helpers::PgDesk;
use chrono::TimeDelta;
use opsdesk::ids::OrgId;
use opsdesk::jobs::domain::{JobKind, JobRequest};
use opsdesk::ledger::{
    domain::{JobOutcome, JobRun, JobRunStatus},
    ports::{JobRunRepository, LedgerStoreError},
};
use serde_json::json;

#[tokio::test(flavor = "multi_thread")]
async fn scoped_sla_scan_job_is_recorded() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;

    let run = desk
        .runner()
        .run(JobRequest::new(JobKind::SlaScan).for_org(organization.id()))
        .await?;
    let stored = desk
        .job_runs
        .find_by_id(run.id())
        .await?
        .ok_or_else(|| eyre::eyre!("job run missing"))?;

    eyre::ensure!(stored.status() == JobRunStatus::Success);
    eyre::ensure!(stored.job_type() == "sla.scan");
    eyre::ensure!(stored.org_id() == Some(organization.id()));
    eyre::ensure!(stored.message() == Some("SLA scan completed for 1 org(s)"));
    eyre::ensure!(stored.finished_at().is_some());
    let recent = desk
        .job_runs
        .list_recent(Some(organization.id()), 5)
        .await?;
    eyre::ensure!(recent.len() == 1, "got {} runs", recent.len());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn a_finished_run_cannot_be_finished_again() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let mut run = JobRun::start(None, "notifications.flush", None, &desk.clock);
    desk.job_runs.create(&run).await?;
    run.complete(
        JobOutcome::Success,
        Some("Flushed 0 email(s)".to_owned()),
        Some(json!({ "scanned": 0, "sent": 0 })),
        &desk.clock,
    )?;
    desk.job_runs.finish(&run).await?;

    let again = desk.job_runs.finish(&run).await;

    eyre::ensure!(
        matches!(again, Err(LedgerStoreError::JobRunNotRunning(id)) if id == run.id()),
        "expected JobRunNotRunning, got {again:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn runs_for_unknown_organizations_are_rejected() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let missing = OrgId::new();
    let run = JobRun::start(Some(missing), "sla.scan", None, &desk.clock);

    let result = desk.job_runs.create(&run).await;

    eyre::ensure!(
        matches!(result, Err(LedgerStoreError::UnknownOrganization(id)) if id == missing),
        "expected UnknownOrganization, got {result:?}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn long_running_jobs_are_listed_as_stale() -> eyre::Result<()> {
    let Some(desk) = PgDesk::connect()? else {
        return Ok(());
    };
    let organization = desk.add_org().await?;
    let stuck = JobRun::start(Some(organization.id()), "workflows.run", None, &desk.clock);
    desk.job_runs.create(&stuck).await?;
    desk.clock.advance(TimeDelta::hours(2));
    let fresh = JobRun::start(Some(organization.id()), "workflows.run", None, &desk.clock);
    desk.job_runs.create(&fresh).await?;

    let cutoff = fresh.started_at() - TimeDelta::hours(1);
    let stale: Vec<_> = desk
        .job_runs
        .list_stale(cutoff, 1000)
        .await?
        .iter()
        .map(JobRun::id)
        .collect();

    eyre::ensure!(stale.contains(&stuck.id()));
    eyre::ensure!(!stale.contains(&fresh.id()));
    Ok(())
}
