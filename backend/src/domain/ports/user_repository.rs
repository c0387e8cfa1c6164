//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::User;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Read-only port for resolving users referenced by results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by its unique email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError>;
}
