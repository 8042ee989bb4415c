//! Storage plumbing shared by every bounded context.
//!
//! - [`memory`]: a process-local database shared by the in-memory adapters
//! - [`postgres`]: connection pool construction and blocking execution helpers
//!   for the Diesel adapters

pub mod memory;
pub mod postgres;

/// Port error types that can wrap an infrastructure failure.
///
/// Implemented by every repository error so shared storage helpers can report
/// lock poisoning, pool exhaustion, or join failures in the caller's error
/// type.
pub trait PersistenceError: Sized {
    /// Wraps an infrastructure failure.
    fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self;
}
