//! Result entity: a score achieved by a user at a point in time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

/// Persisted score entry.
///
/// ## Invariants
/// - `id` is assigned by the persistence layer and never client-supplied.
/// - `result` and `user` are mandatory on creation.
/// - Only `result` and `time` are mutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    id: i32,
    result: i32,
    user: User,
    time: DateTime<Utc>,
}

impl ResultEntry {
    /// Rehydrate an entry from its persisted parts.
    pub fn new(id: i32, result: i32, user: User, time: DateTime<Utc>) -> Self {
        Self {
            id,
            result,
            user,
            time,
        }
    }

    /// Surrogate identifier, immutable after creation.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// The recorded score.
    pub fn result(&self) -> i32 {
        self.result
    }

    /// The owning user; read-only from this component's perspective.
    pub fn user(&self) -> &User {
        &self.user
    }

    /// When the score was achieved.
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Replace the recorded score.
    pub fn set_result(&mut self, result: i32) {
        self.result = result;
    }

    /// Replace the timestamp.
    pub fn set_time(&mut self, time: DateTime<Utc>) {
        self.time = time;
    }
}

impl fmt::Display for ResultEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:3} - {:3} - {} - {}",
            self.id,
            self.result,
            self.user.email(),
            self.time.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

/// Creation payload handed to the repository; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDraft {
    pub result: i32,
    pub user: User,
    pub time: DateTime<Utc>,
}
