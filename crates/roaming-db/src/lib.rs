//! Roaming CDR record store layer
//!
//! This crate provides access to the subscriber directory and the call
//! record store. It includes:
//!
//! - PostgreSQL connection pool management and embedded migrations (sqlx)
//! - Repository implementations backed by PostgreSQL
//! - Process-local repository implementations for tests and local runs
//! - A factory selecting the backend from configuration

pub mod pool;
pub mod repositories;
pub mod storage;

pub use pool::{create_pool, run_migrations};
pub use repositories::*;
pub use storage::{create_storage, Storage};

// Re-export commonly used types
pub use roaming_core::{AppError, AppResult};
pub use sqlx::PgPool;
