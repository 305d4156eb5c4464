//! Usage (UDR) handlers

use crate::dto::{AllUsageParams, MonthParams, UsageResponse};
use crate::state::AppState;
use actix_web::{
    web::{self, Data, Json, Path, Query},
    Result,
};
use roaming_core::AppError;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Usage of one subscriber for a month, or for the last year
///
/// ```text
/// GET /api/v1/udr/79991112233?month=2025-02
/// GET /api/v1/udr/79991112233
/// ```
#[instrument(skip(state, query))]
pub async fn get_usage(
    path: Path<String>,
    query: Query<MonthParams>,
    state: Data<AppState>,
) -> Result<Json<UsageResponse>> {
    query.validate().map_err(|e| {
        warn!("Invalid month parameter: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let msisdn = path.into_inner();
    let summary = state.usage.get_usage(&msisdn, query.month.as_deref()).await?;

    Ok(Json(UsageResponse::from(summary)))
}

/// Usage of every caller for a month, keyed by number
///
/// ```text
/// GET /api/v1/udr/all?month=2025-02
/// ```
#[instrument(skip(state, query))]
pub async fn get_all_usage(
    query: Query<AllUsageParams>,
    state: Data<AppState>,
) -> Result<Json<BTreeMap<String, UsageResponse>>> {
    query.validate().map_err(|e| {
        warn!("Invalid month parameter: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let usage = state.usage.get_all_usage(&query.month).await?;
    info!("Returning {} usage reports for {}", usage.len(), query.month);

    Ok(Json(
        usage
            .into_iter()
            .map(|(msisdn, summary)| (msisdn, UsageResponse::from(summary)))
            .collect(),
    ))
}

/// Configure UDR routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/udr")
            .route("/all", web::get().to(get_all_usage))
            .route("/{msisdn}", web::get().to(get_usage)),
    );
}
