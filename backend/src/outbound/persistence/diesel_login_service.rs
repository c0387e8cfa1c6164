//! Diesel-backed `LoginService` adapter.
//!
//! Looks the account up by email and compares the stored secret; secret
//! provisioning and rotation are owned by the identity side of the system.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::error;

use crate::domain::ports::LoginService;
use crate::domain::{DomainError, Identity, LoginCredentials, UNAUTHORIZED_MESSAGE};

use super::diesel_user_repository::row_to_user;
use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the login port.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new service with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn internal(context: &str, err: impl std::fmt::Display) -> DomainError {
    error!(error = %err, "{context}");
    DomainError::internal("Internal Server Error")
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<Identity, DomainError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| internal("login pool checkout failed", err))?;

        let row = users::table
            .filter(users::email.eq(credentials.email()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| internal("login lookup failed", err))?;

        let Some(row) = row else {
            return Err(DomainError::unauthorized(UNAUTHORIZED_MESSAGE));
        };
        if row.password != credentials.password() {
            return Err(DomainError::unauthorized(UNAUTHORIZED_MESSAGE));
        }

        let user = row_to_user(row).map_err(|err| internal("corrupt account row", err))?;
        Ok(Identity::from(&user))
    }
}
