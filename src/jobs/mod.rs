//! Scheduling shim for background jobs.
//!
//! A [`domain::JobRequest`] names one of three job kinds with an optional
//! organization scope. The [`services::JobScheduler`] derives an
//! idempotency key per request and time bucket so each logical invocation
//! is dispatched at most once, then hands the job to a [`ports::JobQueue`].
//! Queues deliver jobs to a [`ports::JobHandler`], normally the
//! [`services::JobRunner`], which records every execution in the job-run
//! ledger.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
