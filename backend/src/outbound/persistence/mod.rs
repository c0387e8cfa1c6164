//! Persistence adapters: Diesel/PostgreSQL and the in-memory store.

pub(crate) mod diesel_error_mapping;
mod diesel_login_service;
mod diesel_result_repository;
mod diesel_user_repository;
pub mod memory;
pub(crate) mod models;
pub mod pool;
pub mod schema;

pub use diesel_login_service::DieselLoginService;
pub use diesel_result_repository::DieselResultRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
