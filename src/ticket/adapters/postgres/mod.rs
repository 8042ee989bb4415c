//! `PostgreSQL` adapters for tickets and SLA rules.

mod models;
mod repository;

pub use repository::{PostgresSlaRuleRepository, PostgresTicketRepository};
