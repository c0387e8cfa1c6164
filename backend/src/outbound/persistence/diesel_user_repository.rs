//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Email, Role, User};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::UserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> UserPersistenceError {
    map_pool_error(error, UserPersistenceError::connection)
}

fn map_query(error: diesel::result::Error) -> UserPersistenceError {
    map_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Convert a database row into a validated domain user.
pub(crate) fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let UserRow {
        id,
        email,
        password: _,
        roles,
        created_at: _,
    } = row;

    let email = Email::new(email)
        .map_err(|err| UserPersistenceError::query(format!("invalid stored email: {err}")))?;
    let roles = roles
        .iter()
        .map(|raw| raw.parse::<Role>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| UserPersistenceError::query(err.to_string()))?;
    Ok(User::new(id, email, roles))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .find(id)
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query)?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_query)?;

        row.map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion edge cases.

    use chrono::Utc;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn valid_row() -> UserRow {
        UserRow {
            id: 1,
            email: "a@b.com".to_owned(),
            password: "secret".to_owned(),
            roles: vec!["user".to_owned(), "admin".to_owned()],
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn row_conversion_builds_a_domain_user(valid_row: UserRow) {
        let user = row_to_user(valid_row).expect("valid row converts");
        assert_eq!(user.id(), 1);
        assert_eq!(user.email().as_ref(), "a@b.com");
        assert!(user.has_role(Role::Admin));
    }

    #[rstest]
    fn row_conversion_rejects_invalid_email(mut valid_row: UserRow) {
        valid_row.email = "not-an-email".to_owned();

        let error = row_to_user(valid_row).expect_err("invalid email should fail");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
        assert!(error.to_string().contains("invalid stored email"));
    }

    #[rstest]
    fn row_conversion_rejects_unknown_roles(mut valid_row: UserRow) {
        valid_row.roles = vec!["superuser".to_owned()];

        let error = row_to_user(valid_row).expect_err("unknown role should fail");
        assert!(matches!(error, UserPersistenceError::Query { .. }));
        assert!(error.to_string().contains("superuser"));
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool(PoolError::checkout("connection refused"));
        assert!(matches!(repo_err, UserPersistenceError::Connection { .. }));
        assert!(repo_err.to_string().contains("connection refused"));
    }
}
