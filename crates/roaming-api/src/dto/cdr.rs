//! CDR-related DTOs

use roaming_core::{models::Cdr, time::format_timestamp};
use roaming_services::{CdrReport, GenerationStats};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Inclusive `yyyy-MM-dd'T'HH:mm:ss` period
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CdrRangeParams {
    #[validate(length(min = 1, message = "startDate is required"))]
    pub start_date: String,
    #[validate(length(min = 1, message = "endDate is required"))]
    pub end_date: String,
}

/// Report export parameters
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    #[validate(length(min = 1, max = 32, message = "msisdn must be 1 to 32 characters"))]
    pub msisdn: String,
    #[validate(length(min = 1, message = "startDate is required"))]
    pub start_date: String,
    #[validate(length(min = 1, message = "endDate is required"))]
    pub end_date: String,
}

/// CDR as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdrResponse {
    pub id: i64,
    /// `01` outgoing, `02` incoming
    pub call_type: String,
    pub msisdn: String,
    pub other_msisdn: String,
    pub call_start_time: String,
    pub call_end_time: String,
    pub duration_seconds: i64,
}

impl From<Cdr> for CdrResponse {
    fn from(cdr: Cdr) -> Self {
        Self {
            id: cdr.id,
            call_type: cdr.direction.code().to_string(),
            call_start_time: format_timestamp(&cdr.start_time),
            call_end_time: format_timestamp(&cdr.end_time),
            duration_seconds: cdr.duration_seconds(),
            msisdn: cdr.caller_number,
            other_msisdn: cdr.callee_number,
        }
    }
}

/// Result of a CSV report export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: Uuid,
    pub msisdn: String,
    pub file_name: String,
    pub records: usize,
}

impl From<CdrReport> for ReportResponse {
    fn from(report: CdrReport) -> Self {
        let file_name = report
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            id: report.id,
            msisdn: report.msisdn,
            file_name,
            records: report.records,
        }
    }
}

/// Counters of a finished generation run
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub attempts: u64,
    pub dropped_busy: u64,
    pub records: u64,
    pub batches: u64,
}

impl From<GenerationStats> for GenerationResponse {
    fn from(stats: GenerationStats) -> Self {
        Self {
            attempts: stats.attempts,
            dropped_busy: stats.dropped_busy,
            records: stats.records,
            batches: stats.batches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use roaming_core::models::CallDirection;

    #[test]
    fn test_cdr_response_conversion() {
        let start = Utc.with_ymd_and_hms(2025, 2, 10, 12, 0, 0).unwrap();
        let mut cdr = Cdr::new(
            CallDirection::Incoming,
            "79991112233",
            "79992221122",
            start,
            start + Duration::seconds(125),
        );
        cdr.id = 42;

        let response = CdrResponse::from(cdr);
        assert_eq!(response.id, 42);
        assert_eq!(response.call_type, "02");
        assert_eq!(response.msisdn, "79991112233");
        assert_eq!(response.other_msisdn, "79992221122");
        assert_eq!(response.call_start_time, "2025-02-10T12:00:00");
        assert_eq!(response.call_end_time, "2025-02-10T12:02:05");
        assert_eq!(response.duration_seconds, 125);
    }

    #[test]
    fn test_report_params_validation() {
        let params = ReportParams {
            msisdn: String::new(),
            start_date: "2025-02-01T00:00:00".to_string(),
            end_date: "2025-02-28T23:59:59".to_string(),
        };
        assert!(params.validate().is_err());
    }
}
