//! Opsdesk: SLA tracking, auto-assignment, and workflow automation for a
//! multi-tenant IT service desk.
//!
//! # Architecture
//!
//! Opsdesk follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: In-memory and `PostgreSQL` implementations of ports
//!
//! # Modules
//!
//! - [`directory`]: Organizations, members, and teams
//! - [`ticket`]: Tickets, SLA policies, and SLA evaluation
//! - [`assignment`]: Auto-assign rules and round-robin/team-default picks
//! - [`notification`]: In-app notifications, audit trail, and email outbox
//! - [`ledger`]: Workflow-run and job-run records
//! - [`workflow`]: Per-organization automation scans and SLA sweeps
//! - [`jobs`]: Idempotent scheduling and execution of background jobs
//! - [`config`]: TOML and environment configuration
//! - [`telemetry`]: `tracing` subscriber setup

pub mod assignment;
pub mod config;
pub mod directory;
pub mod ids;
pub mod jobs;
pub mod ledger;
pub mod notification;
pub mod storage;
pub mod telemetry;
pub mod ticket;
pub mod workflow;

#[cfg(test)]
mod test_support;
