//! Periodically enqueues the service desk's background jobs.
//!
//! Usage:
//!
//! ```text
//! OPSDESK_DATABASE_URL=postgres://... opsdesk-scheduler
//! ```
//!
//! Settings are read from the TOML file named by `OPSDESK_CONFIG` when set,
//! then overridden by `OPSDESK_DATABASE_URL` and `OPSDESK_LOG`. A
//! representative file is:
//!
//! ```toml
//! log_filter = "opsdesk=debug,info"
//!
//! [database]
//! url = "postgres://opsdesk@localhost/opsdesk"
//! max_connections = 8
//!
//! [scheduler]
//! sla_scan_interval_secs = 300
//! workflow_interval_secs = 600
//! flush_interval_secs = 60
//! ```
//!
//! Each tick enqueues an `sla.scan`, `workflows.run`, or
//! `notifications.flush` job for every organization. Jobs run one at a time
//! on a background worker and are recorded in the job-run ledger. `Ctrl-C`
//! stops the ticks and waits for queued jobs to drain.

use mockable::DefaultClock;
use opsdesk::assignment::{
    adapters::postgres::PostgresAssignmentStore, services::AutoAssignResolver,
};
use opsdesk::config::{ConfigError, DATABASE_URL_ENV, OpsdeskConfig};
use opsdesk::directory::adapters::postgres::PostgresDirectoryRepository;
use opsdesk::jobs::{
    adapters::channel::ChannelJobQueue,
    domain::{JobKind, JobRequest},
    ports::JobQueue,
    services::{JobRunner, JobScheduler},
};
use opsdesk::ledger::adapters::postgres::{PostgresJobRunRepository, PostgresWorkflowRunRepository};
use opsdesk::notification::adapters::postgres::{
    PostgresAuditSink, PostgresEmailOutbox, PostgresNotificationSink,
};
use opsdesk::storage::postgres::{PgPool, build_pool};
use opsdesk::telemetry::{self, TelemetryError};
use opsdesk::ticket::adapters::postgres::PostgresTicketRepository;
use opsdesk::workflow::services::WorkflowPorts;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the scheduler.
#[derive(Debug, Error)]
enum SchedulerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("logging setup failed: {0}")]
    Telemetry(TelemetryError),
    #[error("no database configured; set {DATABASE_URL_ENV} or database.url")]
    MissingDatabaseUrl,
    #[error("failed to build PostgreSQL pool: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

fn main() -> Result<(), BoxError> {
    let config = OpsdeskConfig::load().map_err(SchedulerError::from)?;
    telemetry::init(&config.log_filter).map_err(SchedulerError::Telemetry)?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(SchedulerError::Runtime)?;
    runtime.block_on(run(config)).map_err(|err| {
        error!(error = %err, "scheduler stopped");
        Box::new(err) as BoxError
    })
}

async fn run(config: OpsdeskConfig) -> Result<(), SchedulerError> {
    let url = config
        .database
        .url
        .as_deref()
        .ok_or(SchedulerError::MissingDatabaseUrl)?;
    let pool = build_pool(url, config.database.max_connections)?;
    let clock = Arc::new(DefaultClock);

    let runner = Arc::new(build_runner(&pool, &config, &clock));
    let (queue, worker) = ChannelJobQueue::spawn(runner, config.scheduler.queue_capacity);
    let scheduler = JobScheduler::new(Arc::new(queue), Arc::clone(&clock))
        .with_window_secs(config.scheduler.dedupe_window_secs);

    let mut sla_ticks = time::interval(config.scheduler.sla_scan_interval());
    let mut workflow_ticks = time::interval(config.scheduler.workflow_interval());
    let mut flush_ticks = time::interval(config.scheduler.flush_interval());
    for ticks in [&mut sla_ticks, &mut workflow_ticks, &mut flush_ticks] {
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    }
    info!(
        sla_scan_secs = config.scheduler.sla_scan_interval_secs,
        workflow_secs = config.scheduler.workflow_interval_secs,
        flush_secs = config.scheduler.flush_interval_secs,
        "scheduler started"
    );

    loop {
        let kind = tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(SchedulerError::Signal)?;
                break;
            }
            _ = sla_ticks.tick() => JobKind::SlaScan,
            _ = workflow_ticks.tick() => JobKind::WorkflowsRun,
            _ = flush_ticks.tick() => JobKind::NotificationsFlush,
        };
        enqueue(&scheduler, kind).await;
    }

    info!("shutdown requested; draining queued jobs");
    drop(scheduler);
    if let Err(err) = worker.await {
        error!(error = %err, "job worker ended abnormally");
    }
    Ok(())
}

async fn enqueue<Q>(scheduler: &JobScheduler<Q, DefaultClock>, kind: JobKind)
where
    Q: JobQueue + ?Sized,
{
    match scheduler.enqueue(JobRequest::new(kind)).await {
        Ok(outcome) if outcome.is_accepted() => {
            info!(job_key = %outcome.key(), "job enqueued");
        }
        Ok(outcome) => debug!(job_key = %outcome.key(), "job already queued in this window"),
        Err(err) => error!(%kind, error = %err, "job could not be enqueued"),
    }
}

fn build_runner(
    pool: &PgPool,
    config: &OpsdeskConfig,
    clock: &Arc<DefaultClock>,
) -> JobRunner<DefaultClock> {
    let resolver = AutoAssignResolver::new(
        Arc::new(PostgresAssignmentStore::new(pool.clone())),
        Arc::clone(clock),
    );
    let ports = WorkflowPorts {
        directory: Arc::new(PostgresDirectoryRepository::new(pool.clone())),
        tickets: Arc::new(PostgresTicketRepository::new(pool.clone())),
        resolver: Arc::new(resolver),
        runs: Arc::new(PostgresWorkflowRunRepository::new(pool.clone())),
        notifications: Arc::new(PostgresNotificationSink::new(pool.clone(), Arc::clone(clock))),
        audit: Arc::new(PostgresAuditSink::new(pool.clone())),
    };
    JobRunner::from_ports(
        ports,
        Arc::new(PostgresJobRunRepository::new(pool.clone())),
        Arc::new(PostgresEmailOutbox::new(pool.clone())),
        clock,
        config.automation,
    )
}
