//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{LoginService, ResultRepository, UserRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub results: Arc<dyn ResultRepository>,
    pub users: Arc<dyn UserRepository>,
    pub login: Arc<dyn LoginService>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Construct state from port implementations.
    pub fn new(
        results: Arc<dyn ResultRepository>,
        users: Arc<dyn UserRepository>,
        login: Arc<dyn LoginService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            results,
            users,
            login,
            clock,
        }
    }
}
