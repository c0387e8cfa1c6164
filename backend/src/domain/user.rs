//! User data model.
//!
//! Users are owned by the identity side of the system; this component only
//! reads them to resolve the `Result` association and to authenticate. The
//! password never appears on the domain type.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::auth::Role;

/// Validation errors returned by [`Email::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    Empty,
    Invalid,
}

impl fmt::Display for EmailValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "email must not be empty"),
            Self::Invalid => write!(f, "email must contain a local part and a domain"),
        }
    }
}

impl std::error::Error for EmailValidationError {}

/// Unique user identifier used for lookups from the Results resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validate and construct an [`Email`].
    ///
    /// The check is deliberately shallow: a non-empty trimmed value with a
    /// local part and a domain separated by `@`. Deliverability is the
    /// identity provider's concern.
    pub fn new(value: impl Into<String>) -> Result<Self, EmailValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(EmailValidationError::Empty);
        }
        if value.trim() != value {
            return Err(EmailValidationError::Invalid);
        }
        match value.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(Self(value)),
            _ => Err(EmailValidationError::Invalid),
        }
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl TryFrom<String> for Email {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Domain user referenced by `Result` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    id: i32,
    email: Email,
    roles: Vec<Role>,
}

impl User {
    /// Construct a user from its persisted parts.
    pub fn new(id: i32, email: Email, roles: Vec<Role>) -> Self {
        Self { id, email, roles }
    }

    /// Surrogate identifier assigned by the persistence layer.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Unique lookup key for the user.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Roles granted to the user.
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Capability test decoupled from the role representation.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
