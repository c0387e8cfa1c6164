//! Port for Result entity persistence.
//!
//! Each operation commits its single logical write; no cross-call
//! transaction handle is exposed.

use async_trait::async_trait;

use crate::domain::{ResultDraft, ResultEntry};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by result repository adapters.
    pub enum ResultRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "result repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "result repository query failed: {message}",
    }
}

/// Port for reading and mutating persisted results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Fetch a result by id.
    async fn find(&self, id: i32) -> Result<Option<ResultEntry>, ResultRepositoryError>;

    /// Fetch every result, ordered by ascending id.
    async fn find_all(&self) -> Result<Vec<ResultEntry>, ResultRepositoryError>;

    /// Fetch the results belonging to a user, ordered by ascending id.
    async fn find_by_user(&self, user_id: i32)
        -> Result<Vec<ResultEntry>, ResultRepositoryError>;

    /// Persist a new result and return it with its store-assigned id.
    async fn add(&self, draft: &ResultDraft) -> Result<ResultEntry, ResultRepositoryError>;

    /// Persist mutations to an existing result.
    async fn save(&self, entry: &ResultEntry) -> Result<(), ResultRepositoryError>;

    /// Hard-delete a result. Returns whether a row existed.
    async fn remove(&self, id: i32) -> Result<bool, ResultRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn query_error_formats_message() {
        let err = ResultRepositoryError::query("broken sql");
        assert!(err.to_string().contains("broken sql"));
    }

    #[rstest]
    fn connection_error_formats_message() {
        let err = ResultRepositoryError::connection("refused");
        assert!(matches!(err, ResultRepositoryError::Connection { .. }));
        assert!(err.to_string().contains("refused"));
    }
}
