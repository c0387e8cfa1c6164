//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, web};
use mockable::DefaultClock;

use crate::domain::Role;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::memory::{
    InMemoryStore, MemoryLoginService, MemoryResultRepository, MemoryUserRepository,
};

/// Email of the seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@example.com";
/// Email of the seeded non-admin account.
pub const MEMBER_EMAIL: &str = "user@example.com";
/// Password shared by the seeded accounts.
pub const PASSWORD: &str = "password";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Handler state backed by a seeded in-memory store.
///
/// Seeds an admin (id 1) and a regular member (id 2); the store handle is
/// returned so tests can seed further users or inspect rows.
pub fn seeded_state() -> (HttpState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::default());
    store
        .seed_user(ADMIN_EMAIL, PASSWORD, vec![Role::User, Role::Admin])
        .expect("seed admin");
    store
        .seed_user(MEMBER_EMAIL, PASSWORD, vec![Role::User])
        .expect("seed member");
    let state = HttpState::new(
        Arc::new(MemoryResultRepository::new(store.clone())),
        Arc::new(MemoryUserRepository::new(store.clone())),
        Arc::new(MemoryLoginService::new(store.clone())),
        Arc::new(DefaultClock),
    );
    (state, store)
}

/// Full application with the production route table and a test session
/// middleware.
pub fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let health = HealthState::new();
    health.mark_ready();
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::Data::new(health))
        .wrap(test_session_middleware())
        .configure(crate::server::routes)
}
