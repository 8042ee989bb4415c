//! Port contracts for the organization directory.

mod repository;

pub use repository::{DirectoryRepository, DirectoryRepositoryError, DirectoryRepositoryResult};
