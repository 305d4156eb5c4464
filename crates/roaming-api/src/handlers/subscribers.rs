//! Subscriber directory handlers

use crate::dto::ApiResponse;
use crate::state::AppState;
use actix_web::{
    web::{self, Data, Json},
    Result,
};
use roaming_core::models::Subscriber;
use tracing::{debug, instrument};

/// List every subscriber
///
/// ```text
/// GET /api/v1/subscribers
/// ```
#[instrument(skip(state))]
pub async fn list_subscribers(state: Data<AppState>) -> Result<Json<ApiResponse<Vec<Subscriber>>>> {
    let subscribers = state.directory.list().await?;
    debug!("Listing {} subscribers", subscribers.len());
    Ok(Json(ApiResponse::success(subscribers)))
}

/// Configure subscriber routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/subscribers", web::get().to(list_subscribers));
}
