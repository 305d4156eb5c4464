//! CDR handlers: generation, per-subscriber listing and CSV reports

use crate::dto::{
    ApiResponse, CdrRangeParams, CdrResponse, GenerationResponse, ReportParams, ReportResponse,
};
use crate::state::AppState;
use actix_web::{
    web::{self, Data, Json, Path, Query},
    Result,
};
use roaming_core::AppError;
use roaming_services::parse_range;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Generate a call history for the subscriber directory
///
/// Returns 409 while another run is in progress.
///
/// ```text
/// POST /api/v1/cdr/generate
/// ```
#[instrument(skip(state))]
pub async fn generate(state: Data<AppState>) -> Result<Json<ApiResponse<GenerationResponse>>> {
    let stats = state.generator.run_generation().await?;

    info!("Generated {} CDRs on request", stats.records);

    Ok(Json(ApiResponse::with_message(
        GenerationResponse::from(stats),
        "CDR generation completed",
    )))
}

/// Calls a subscriber took part in during an inclusive period
///
/// ```text
/// GET /api/v1/cdr/79991112233?startDate=2025-02-01T00:00:00&endDate=2025-02-28T23:59:59
/// ```
#[instrument(skip(state, query))]
pub async fn list_for_subscriber(
    path: Path<String>,
    query: Query<CdrRangeParams>,
    state: Data<AppState>,
) -> Result<Json<ApiResponse<Vec<CdrResponse>>>> {
    query.validate().map_err(|e| {
        warn!("Invalid query parameters: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let msisdn = path.into_inner();
    let window = parse_range(&query.start_date, &query.end_date)?;

    let cdrs = state
        .reports
        .find_for_subscriber(&msisdn, window.start, window.end)
        .await?;

    info!("Retrieved {} CDRs for {}", cdrs.len(), msisdn);

    Ok(Json(ApiResponse::success(
        cdrs.into_iter().map(CdrResponse::from).collect(),
    )))
}

/// Export a subscriber's calls for an inclusive period to a CSV file
///
/// ```text
/// POST /api/v1/cdr/generate-report?msisdn=79991112233&startDate=2025-02-01T00:00:00&endDate=2025-02-28T23:59:59
/// ```
#[instrument(skip(state, query))]
pub async fn generate_report(
    query: Query<ReportParams>,
    state: Data<AppState>,
) -> Result<Json<ApiResponse<ReportResponse>>> {
    query.validate().map_err(|e| {
        warn!("Invalid query parameters: {}", e);
        AppError::Validation(e.to_string())
    })?;

    let report = state
        .reports
        .generate_report(&query.msisdn, &query.start_date, &query.end_date)
        .await?;

    let message = format!("Report created. UUID: {}", report.id);
    Ok(Json(ApiResponse::with_message(
        ReportResponse::from(report),
        message,
    )))
}

/// Configure CDR routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cdr")
            .route("/generate", web::post().to(generate))
            .route("/generate-report", web::post().to(generate_report))
            .route("/{msisdn}", web::get().to(list_for_subscriber)),
    );
}
