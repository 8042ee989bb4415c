//! `PostgreSQL` adapters for workflow and job run records.

mod models;
mod repository;

pub use repository::{PostgresJobRunRepository, PostgresWorkflowRunRepository};
