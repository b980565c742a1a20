//! HTTP server layer
//!
//! Axum server with:
//! - CORS (configured origins by default)
//! - Request tracing and timeouts
//! - Graceful shutdown
//! - JSON envelopes for success and error responses

pub mod envelope;
pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use envelope::{ActionResult, Envelope};
pub use error::ApiError;
pub use server::{build_router, run_server, AppState, ServerError};
