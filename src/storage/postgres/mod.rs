//! `PostgreSQL` pool and execution helpers for Diesel adapters.

pub mod schema;

use super::PersistenceError;
use diesel::Connection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by every adapter.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for the given database URL.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot establish its initial
/// connections.
pub fn build_pool(database_url: &str, max_connections: u32) -> Result<PgPool, PoolError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().max_size(max_connections).build(manager)
}

/// Runs a synchronous Diesel operation on the blocking thread pool.
///
/// Pool checkout and join failures are reported through `E::persistence`.
pub(crate) async fn run_blocking<F, T, E>(pool: &PgPool, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: PersistenceError + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(E::persistence)?;
        f(&mut connection)
    })
    .await
    .map_err(E::persistence)?
}

/// Runs `f` inside a database transaction.
///
/// The transaction commits when `f` returns `Ok` and rolls back otherwise.
/// Errors raised by `f` are returned unchanged; failures to begin, commit, or
/// roll back are reported through `E::persistence`.
pub(crate) fn in_transaction<T, E, F>(connection: &mut PgConnection, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E>,
    E: PersistenceError,
{
    connection
        .transaction::<T, TransactionAbort<E>, _>(|tx| f(tx).map_err(TransactionAbort::Caller))
        .map_err(|abort| match abort {
            TransactionAbort::Caller(err) => err,
            TransactionAbort::Database(err) => E::persistence(err),
        })
}

enum TransactionAbort<E> {
    Caller(E),
    Database(DieselError),
}

impl<E> From<DieselError> for TransactionAbort<E> {
    fn from(err: DieselError) -> Self {
        Self::Database(err)
    }
}

/// Returns `true` when the error is a foreign-key violation.
pub(crate) const fn is_foreign_key_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _)
    )
}

/// Returns `true` when the error is a unique-constraint violation.
pub(crate) const fn is_unique_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

/// Converts a persisted `BIGINT` into an unsigned domain counter.
pub(crate) fn to_unsigned<E: PersistenceError>(value: i64) -> Result<u64, E> {
    u64::try_from(value).map_err(E::persistence)
}

/// Converts an unsigned domain counter into a `BIGINT` column value.
pub(crate) fn to_signed<E: PersistenceError>(value: u64) -> Result<i64, E> {
    i64::try_from(value).map_err(E::persistence)
}

/// Converts a row limit into a `LIMIT` clause value.
pub(crate) fn to_row_limit<E: PersistenceError>(limit: usize) -> Result<i64, E> {
    i64::try_from(limit).map_err(E::persistence)
}
