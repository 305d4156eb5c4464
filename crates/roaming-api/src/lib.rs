//! API layer for the roaming CDR service
//!
//! Thin HTTP adapter over the services: handlers validate query parameters,
//! call one service operation and map the result to JSON. Errors render
//! through `AppError`'s `ResponseError` implementation.

#![forbid(unsafe_code)]

pub mod dto;
pub mod handlers;
pub mod state;

pub use dto::ApiResponse;
pub use handlers::{configure, query_config};
pub use state::AppState;
