//! Authentication and authorization primitives.
//!
//! [`Identity`] is the authenticated principal the session carries between
//! requests; [`Role`] is the capability vocabulary handlers check against.
//! Credential validation lives behind the `LoginService` port so adapters
//! never see the backing identity store.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{Email, User};

/// Capability granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Baseline authenticated access.
    User,
    /// Elevated capability required for mutating operations.
    Admin,
}

impl Role {
    /// Stable string form used by persistence adapters.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored role string is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Authenticated principal persisted in the session between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    user_id: i32,
    email: Email,
    roles: Vec<Role>,
}

impl Identity {
    /// Build an identity from its parts.
    pub fn new(user_id: i32, email: Email, roles: Vec<Role>) -> Self {
        Self {
            user_id,
            email,
            roles,
        }
    }

    /// Identifier of the authenticated user.
    pub fn user_id(&self) -> i32 {
        self.user_id
    }

    /// Email of the authenticated user.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Capability test decoupled from any identity-provider representation.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self::new(user.id(), user.email().clone(), user.roles().to_vec())
    }
}

/// Validation errors emitted by [`LoginCredentials::try_from_parts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    EmptyEmail,
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated credential pair handed to the `LoginService` port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: String,
}

impl LoginCredentials {
    /// Validate the credential shape without consulting any store.
    pub fn try_from_parts(
        email: &str,
        password: &str,
    ) -> Result<Self, LoginValidationError> {
        if email.trim().is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: password.to_owned(),
        })
    }

    /// The claimed account email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// The claimed secret.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user", Ok(Role::User))]
    #[case("admin", Ok(Role::Admin))]
    #[case("root", Err(UnknownRole("root".to_owned())))]
    fn role_round_trip(#[case] raw: &str, #[case] expected: Result<Role, UnknownRole>) {
        assert_eq!(raw.parse::<Role>(), expected);
        if let Ok(role) = expected {
            assert_eq!(role.as_str(), raw);
        }
    }

    #[rstest]
    fn identity_checks_roles() {
        let email = Email::new("admin@example.com").expect("valid email");
        let identity = Identity::new(1, email, vec![Role::User, Role::Admin]);
        assert!(identity.has_role(Role::Admin));
        assert!(identity.has_role(Role::User));
    }

    #[rstest]
    fn identity_survives_session_serialization() {
        let email = Email::new("a@b.com").expect("valid email");
        let identity = Identity::new(7, email, vec![Role::User]);
        let json = serde_json::to_string(&identity).expect("serializes");
        let back: Identity = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, identity);
    }

    #[rstest]
    #[case("  ", "password", Err(LoginValidationError::EmptyEmail))]
    #[case("a@b.com", "", Err(LoginValidationError::EmptyPassword))]
    fn credential_shape_is_validated(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: Result<LoginCredentials, LoginValidationError>,
    ) {
        assert_eq!(LoginCredentials::try_from_parts(email, password), expected);
    }

    #[rstest]
    fn credentials_expose_parts() {
        let creds =
            LoginCredentials::try_from_parts("a@b.com", "secret").expect("valid credentials");
        assert_eq!(creds.email(), "a@b.com");
        assert_eq!(creds.password(), "secret");
    }
}
