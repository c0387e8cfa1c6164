//! Backend entry-point: wires the Results REST endpoints and persistence.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use mockable::DefaultClock;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use results_api::domain::Role;
use results_api::inbound::http::state::HttpState;
use results_api::outbound::persistence::memory::{
    InMemoryStore, MemoryLoginService, MemoryResultRepository, MemoryUserRepository,
};
use results_api::outbound::persistence::{
    DbPool, DieselLoginService, DieselResultRepository, DieselUserRepository, PoolConfig,
};
use results_api::server::{self, config::ServerConfig};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let key = session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(std::io::Error::other)?;

    let state = build_state().await?;
    let config = ServerConfig::new(key, cookie_secure, SameSite::Lax, bind_addr);
    server::run(config, state).await
}

fn session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

/// Choose the persistence backend from the environment.
///
/// With `DATABASE_URL` set the Diesel adapters are used; without it the
/// server falls back to a seeded in-memory store for local development.
async fn build_state() -> std::io::Result<HttpState> {
    let clock = Arc::new(DefaultClock);
    match env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(std::io::Error::other)?;
            Ok(HttpState::new(
                Arc::new(DieselResultRepository::new(pool.clone())),
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselLoginService::new(pool)),
                clock,
            ))
        }
        Err(_) => {
            warn!("DATABASE_URL not set; serving from an in-memory store (dev only)");
            let store = Arc::new(InMemoryStore::default());
            store
                .seed_user("admin@example.com", "password", vec![Role::User, Role::Admin])
                .map_err(std::io::Error::other)?;
            store
                .seed_user("user@example.com", "password", vec![Role::User])
                .map_err(std::io::Error::other)?;
            Ok(HttpState::new(
                Arc::new(MemoryResultRepository::new(store.clone())),
                Arc::new(MemoryUserRepository::new(store.clone())),
                Arc::new(MemoryLoginService::new(store)),
                clock,
            ))
        }
    }
}
