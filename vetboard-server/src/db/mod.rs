//! Database layer - connection pool, schema, and repositories
//!
//! - Bounded connection pool
//! - List operations return page + total in one query (`COUNT(*) OVER()`)
//! - Constraint violations map to domain errors, no check-then-insert
//! - Transactions for multi-step writes

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repos;

pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options, lazy_pool};
pub use repos::*;
