//! vetboard-server: HTTP API for a veterinary job board and community
//!
//! Résumés, job postings and applications, clinic transfers, lectures,
//! a forum, direct messages, bookmarks, and an admin back-office, all
//! backed by PostgreSQL.

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use config::{ConfigError, ServerConfig};
pub use db::{create_pool, create_pool_with_options, DbError};
pub use http::{build_router, run_server, AppState, ServerError};
