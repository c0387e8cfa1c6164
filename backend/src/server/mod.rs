//! HTTP server assembly: session middleware, route table, runtime wiring.

pub mod config;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Key, SameSite};
use actix_web::{App, HttpServer, web};

use crate::inbound::http::health::{self, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{results, users};

use self::config::ServerConfig;

/// Build the cookie session middleware shared by all protected routes.
pub fn session_middleware(
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_path("/".to_owned())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(same_site)
        .build()
}

/// Register every HTTP service: the Results resource, login, and probes.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(results::list)
        .service(results::get_by_id)
        .service(results::get_by_user)
        .service(results::create)
        .service(results::update)
        .service(results::remove)
        .service(results::options_collection)
        .service(results::options_item)
        .service(users::login)
        .service(health::ready)
        .service(health::live);
}

/// Bind and run the server until shutdown.
pub async fn run(config: ServerConfig, state: HttpState) -> std::io::Result<()> {
    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays accessible.
    let server_health_state = health_state.clone();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
    } = config;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(server_health_state.clone())
            .wrap(session_middleware(key.clone(), cookie_secure, same_site))
            .configure(routes)
    })
    .bind(bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
