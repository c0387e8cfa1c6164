//! Shared mapping from Diesel and pool failures to port error constructors.

use super::pool::PoolError;

/// Map a pool checkout/build failure to a port connection error.
pub(crate) fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    connection(error.to_string())
}

/// Map a Diesel execution failure to a port error, splitting connection-level
/// breakage from query-level failure.
pub(crate) fn map_diesel_error<E>(
    error: diesel::result::Error,
    query: impl FnOnce(String) -> E,
    connection: impl FnOnce(String) -> E,
) -> E {
    match error {
        diesel::result::Error::BrokenTransactionManager
        | diesel::result::Error::AlreadyInTransaction
        | diesel::result::Error::NotInTransaction => connection(error.to_string()),
        other => query(other.to_string()),
    }
}
