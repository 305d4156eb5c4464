//! Roaming CDR core library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the roaming CDR service. It includes:
//!
//! - Domain models (Subscriber, Cdr, UsageSummary)
//! - Repository traits for the subscriber directory and the record store
//! - Unified error handling with HTTP response mapping
//! - Application configuration
//! - Month/timestamp parsing and duration formatting helpers

pub mod config;
pub mod error;
pub mod models;
pub mod time;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
