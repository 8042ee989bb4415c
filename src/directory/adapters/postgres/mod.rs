//! `PostgreSQL` adapters for the organization directory.

mod models;
mod repository;

pub use repository::PostgresDirectoryRepository;
