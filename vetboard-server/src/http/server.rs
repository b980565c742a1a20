//! Axum server setup
//!
//! Server skeleton with:
//! - Configured-origin CORS by default
//! - Tracing and per-request timeout middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::auth::TokenVerifier;
use crate::config::ServerConfig;

/// Shared application state
pub struct AppState {
    pub pool: PgPool,
    pub verifier: TokenVerifier,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: ServerConfig) -> Self {
        let verifier = TokenVerifier::new(&config.jwt_secret);
        Self {
            pool,
            verifier,
            config,
        }
    }
}

/// Build the full router with middleware applied.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors);

    Router::new()
        .merge(routes::health::router())
        .merge(routes::me::router())
        .merge(routes::actions::router())
        .merge(routes::resumes::router())
        .merge(routes::jobs::router())
        .merge(routes::applications::router())
        .merge(routes::transfers::router())
        .merge(routes::forum::router())
        .merge(routes::lectures::router())
        .merge(routes::messages::router())
        .merge(routes::bookmarks::router())
        .merge(routes::admin::router())
        .layer(middleware)
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config.database_url).await?;
/// run_server(pool, config).await?;
/// ```
pub async fn run_server(pool: PgPool, config: ServerConfig) -> Result<(), ServerError> {
    let bind_addr = config.bind_addr;
    let state = Arc::new(AppState::new(pool, config));
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::auth::test_support::SECRET;

    /// State over a pool that never connects; fine for requests that fail
    /// before touching the database.
    pub fn lazy_state() -> Arc<AppState> {
        let pool = crate::db::lazy_pool("postgres://vetboard@127.0.0.1:1/vetboard_test").expect("lazy pool");
        let config = ServerConfig {
            jwt_secret: SECRET.to_string(),
            ..ServerConfig::default()
        };
        Arc::new(AppState::new(pool, config))
    }

    /// State over the database named by `DATABASE_URL`, migrated.
    pub async fn db_state() -> Arc<AppState> {
        let pool = crate::db::repos::users::test_support::test_pool().await;
        let config = ServerConfig {
            jwt_secret: SECRET.to_string(),
            ..ServerConfig::default()
        };
        Arc::new(AppState::new(pool, config))
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::lazy_state;
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_is_routed() {
        let app = build_router(lazy_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = build_router(lazy_state());
        let response = app
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_cors_origins_are_skipped() {
        let config = ServerConfig {
            cors_origins: vec!["http://localhost:3000".into(), "bad\norigin".into()],
            ..ServerConfig::default()
        };
        let _ = cors_layer(&config);
    }
}
