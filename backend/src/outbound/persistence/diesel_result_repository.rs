//! PostgreSQL-backed `ResultRepository` implementation using Diesel ORM.
//!
//! Reads join the owning user so the domain entity always carries its
//! association; every mutation is a single committed statement.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ResultRepository, ResultRepositoryError};
use crate::domain::{ResultDraft, ResultEntry};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_user_repository::row_to_user;
use super::models::{NewResultRow, ResultChangeset, ResultRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{results, users};

/// Diesel-backed implementation of the result repository port.
#[derive(Clone)]
pub struct DieselResultRepository {
    pool: DbPool,
}

impl DieselResultRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ResultRepositoryError {
    map_pool_error(error, ResultRepositoryError::connection)
}

fn map_query(error: diesel::result::Error) -> ResultRepositoryError {
    map_diesel_error(
        error,
        ResultRepositoryError::query,
        ResultRepositoryError::connection,
    )
}

/// Convert a joined row pair into a validated domain entity.
fn row_to_entry(row: ResultRow, user_row: UserRow) -> Result<ResultEntry, ResultRepositoryError> {
    let user = row_to_user(user_row).map_err(|err| ResultRepositoryError::query(err.to_string()))?;
    Ok(ResultEntry::new(row.id, row.result, user, row.time))
}

#[async_trait]
impl ResultRepository for DieselResultRepository {
    async fn find(&self, id: i32) -> Result<Option<ResultEntry>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = results::table
            .inner_join(users::table)
            .filter(results::id.eq(id))
            .select((ResultRow::as_select(), UserRow::as_select()))
            .first::<(ResultRow, UserRow)>(&mut conn)
            .await
            .optional()
            .map_err(map_query)?;

        row.map(|(result, user)| row_to_entry(result, user))
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<ResultEntry>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(ResultRow, UserRow)> = results::table
            .inner_join(users::table)
            .order(results::id.asc())
            .select((ResultRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_query)?;

        rows.into_iter()
            .map(|(result, user)| row_to_entry(result, user))
            .collect()
    }

    async fn find_by_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<ResultEntry>, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(ResultRow, UserRow)> = results::table
            .inner_join(users::table)
            .filter(results::user_id.eq(user_id))
            .order(results::id.asc())
            .select((ResultRow::as_select(), UserRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_query)?;

        rows.into_iter()
            .map(|(result, user)| row_to_entry(result, user))
            .collect()
    }

    async fn add(&self, draft: &ResultDraft) -> Result<ResultEntry, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewResultRow {
            result: draft.result,
            user_id: draft.user.id(),
            time: draft.time,
        };

        let row = diesel::insert_into(results::table)
            .values(&new_row)
            .returning(ResultRow::as_returning())
            .get_result::<ResultRow>(&mut conn)
            .await
            .map_err(map_query)?;

        Ok(ResultEntry::new(
            row.id,
            row.result,
            draft.user.clone(),
            row.time,
        ))
    }

    async fn save(&self, entry: &ResultEntry) -> Result<(), ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::update(results::table.find(entry.id()))
            .set(&ResultChangeset {
                result: entry.result(),
                time: entry.time(),
            })
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_query)
    }

    async fn remove(&self, id: i32) -> Result<bool, ResultRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let deleted = diesel::delete(results::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_query)?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool(PoolError::checkout("connection refused"));

        assert!(matches!(repo_err, ResultRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_error_maps_to_query_error() {
        let repo_err = map_query(diesel::result::Error::NotFound);

        assert!(matches!(repo_err, ResultRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_rejects_corrupt_user_rows() {
        let now = Utc::now();
        let result_row = ResultRow {
            id: 1,
            result: 7,
            user_id: 2,
            time: now,
        };
        let user_row = UserRow {
            id: 2,
            email: "broken".to_owned(),
            password: "secret".to_owned(),
            roles: vec!["user".to_owned()],
            created_at: now,
        };

        let error = row_to_entry(result_row, user_row).expect_err("corrupt email should fail");
        assert!(matches!(error, ResultRepositoryError::Query { .. }));
    }
}
