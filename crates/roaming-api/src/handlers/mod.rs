//! HTTP request handlers

pub mod cdr;
pub mod health;
pub mod subscribers;
pub mod udr;

use actix_web::{error::InternalError, web, HttpResponse};
use roaming_core::AppError;
use serde_json::json;

pub use cdr::configure as configure_cdr;
pub use health::health_check;
pub use subscribers::configure as configure_subscribers;
pub use udr::configure as configure_udr;

/// Mount every route under `/api/v1`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(configure_subscribers)
            .configure(configure_cdr)
            .configure(configure_udr),
    );
}

/// Query extractor settings: malformed or missing parameters become a 400
/// with the same body as [`AppError::Validation`]
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let error = AppError::Validation(err.to_string());
        let body = json!({
            "error": error.error_code(),
            "message": error.to_string(),
            "status": 400,
        });
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}
