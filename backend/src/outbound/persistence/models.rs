//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{results, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i32,
    pub email: String,
    pub password: String,
    pub roles: Vec<String>,
    #[expect(dead_code, reason = "schema field kept for audit queries")]
    pub created_at: DateTime<Utc>,
}

/// Row struct for reading from the results table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = results)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ResultRow {
    pub id: i32,
    pub result: i32,
    #[expect(dead_code, reason = "the joined user row carries the association")]
    pub user_id: i32,
    pub time: DateTime<Utc>,
}

/// Insertable struct for creating new result records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = results)]
pub(crate) struct NewResultRow {
    pub result: i32,
    pub user_id: i32,
    pub time: DateTime<Utc>,
}

/// Changeset struct for updating existing result records.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = results)]
pub(crate) struct ResultChangeset {
    pub result: i32,
    pub time: DateTime<Utc>,
}
