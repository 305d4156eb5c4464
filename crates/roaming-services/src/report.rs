//! Per-subscriber CDR listing and CSV report export
//!
//! Reports are written as `<reports_dir>/<msisdn>_<uuid>.csv`, one row per
//! call and no header row:
//!
//! ```text
//! callType,msisdn,otherMsisdn,callStartTime,callEndTime
//! 01,79991112233,79992221122,2025-02-10T12:00:00,2025-02-10T12:02:05
//! ```

use chrono::{DateTime, Duration, Utc};
use roaming_core::{
    models::Cdr,
    time::{format_timestamp, parse_timestamp, TimeWindow},
    traits::CdrRepository,
    AppError, AppResult,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// A written CSV report
#[derive(Debug, Clone, Serialize)]
pub struct CdrReport {
    pub id: Uuid,
    pub msisdn: String,
    pub path: PathBuf,
    pub records: usize,
}

/// Parse an inclusive `yyyy-MM-dd'T'HH:mm:ss` range into a half-open window
///
/// Timestamps have whole-second precision, so the window ends one second
/// after `end`.
pub fn parse_range(start: &str, end: &str) -> AppResult<TimeWindow> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;

    if start > end {
        return Err(AppError::Validation(format!(
            "startDate {} is after endDate {}",
            format_timestamp(&start),
            format_timestamp(&end)
        )));
    }

    let end = end
        .checked_add_signed(Duration::seconds(1))
        .ok_or_else(|| {
            AppError::Validation(format!(
                "endDate {} is out of range",
                format_timestamp(&end)
            ))
        })?;

    Ok(TimeWindow::new(start, end))
}

/// Subscriber numbers name report files, so only digits are accepted
fn ensure_msisdn(msisdn: &str) -> AppResult<()> {
    if msisdn.is_empty() || !msisdn.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::Validation(format!(
            "Invalid msisdn '{}'. Only digits are allowed",
            msisdn
        )));
    }
    Ok(())
}

/// CDR lookups and CSV export for one subscriber
pub struct CdrReportService<C: CdrRepository + ?Sized> {
    cdrs: Arc<C>,
    reports_dir: PathBuf,
}

impl<C: CdrRepository + ?Sized> CdrReportService<C> {
    pub fn new(cdrs: Arc<C>, reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            cdrs,
            reports_dir: reports_dir.into(),
        }
    }

    /// Calls the subscriber took part in, started in `[start, end)`
    #[instrument(skip(self))]
    pub async fn find_for_subscriber(
        &self,
        msisdn: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Cdr>> {
        self.cdrs
            .find_by_participant_and_time_range(msisdn, start, end)
            .await
    }

    /// Write the subscriber's calls between `start` and `end` to a new CSV file
    ///
    /// Both bounds are inclusive `yyyy-MM-dd'T'HH:mm:ss` timestamps. A period
    /// without calls still produces an empty file.
    #[instrument(skip(self))]
    pub async fn generate_report(&self, msisdn: &str, start: &str, end: &str) -> AppResult<CdrReport> {
        ensure_msisdn(msisdn)?;
        let window = parse_range(start, end)?;
        let records = self.find_for_subscriber(msisdn, window.start, window.end).await?;

        let content = render_csv(&records)?;

        let id = Uuid::new_v4();
        let path = self.reports_dir.join(format!("{}_{}.csv", msisdn, id));

        tokio::fs::create_dir_all(&self.reports_dir).await.map_err(|e| {
            error!("Failed to create reports directory {:?}: {}", self.reports_dir, e);
            AppError::Internal(format!("Failed to create reports directory: {}", e))
        })?;
        tokio::fs::write(&path, content).await.map_err(|e| {
            error!("Failed to write report {:?}: {}", path, e);
            AppError::Internal(format!("Failed to write report: {}", e))
        })?;

        info!("Report {} written with {} CDRs to {:?}", id, records.len(), path);

        Ok(CdrReport {
            id,
            msisdn: msisdn.to_string(),
            path,
            records: records.len(),
        })
    }
}

fn render_csv(records: &[Cdr]) -> AppResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    for cdr in records {
        let start = format_timestamp(&cdr.start_time);
        let end = format_timestamp(&cdr.end_time);
        writer
            .write_record([
                cdr.direction.code(),
                cdr.caller_number.as_str(),
                cdr.callee_number.as_str(),
                start.as_str(),
                end.as_str(),
            ])
            .map_err(|e| AppError::Serialization(format!("Failed to encode CSV row: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::Serialization(format!("Failed to finish CSV report: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use roaming_core::models::CallDirection;
    use roaming_db::InMemoryCdrRepository;

    async fn service(dir: &std::path::Path) -> CdrReportService<InMemoryCdrRepository> {
        let store = Arc::new(InMemoryCdrRepository::new());
        let start = Utc.with_ymd_and_hms(2025, 2, 10, 12, 0, 0).unwrap();
        store
            .append_batch(&[
                Cdr::new(
                    CallDirection::Outgoing,
                    "79991112233",
                    "79992221122",
                    start,
                    start + Duration::seconds(125),
                ),
                Cdr::new(
                    CallDirection::Incoming,
                    "79993332211",
                    "79991112233",
                    start + Duration::hours(2),
                    start + Duration::hours(2) + Duration::seconds(30),
                ),
                Cdr::new(
                    CallDirection::Outgoing,
                    "79993332211",
                    "79994443322",
                    start,
                    start + Duration::seconds(10),
                ),
            ])
            .await
            .unwrap();
        CdrReportService::new(store, dir)
    }

    #[test]
    fn test_parse_range_end_is_inclusive() {
        let window = parse_range("2025-02-01T00:00:00", "2025-02-28T23:59:59").unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_range_rejects_bad_input() {
        assert!(matches!(
            parse_range("2025-02-01", "2025-02-28T23:59:59"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_range("2025-03-01T00:00:00", "2025-02-01T00:00:00"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_range_rejects_extended_years() {
        assert!(matches!(
            parse_range("+262142-12-31T23:59:59", "+262142-12-31T23:59:59"),
            Err(AppError::Validation(_))
        ));

        let window = parse_range("9999-12-31T00:00:00", "9999-12-31T23:59:59").unwrap();
        assert_eq!(window.end, Utc.with_ymd_and_hms(10_000, 1, 1, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_report_rejects_path_in_msisdn() {
        let dir = tempfile::tempdir().unwrap();
        let reports_dir = dir.path().join("reports");
        let service = service(&reports_dir).await;

        for msisdn in ["../x", "../../etc/escaped", "7999/1", ""] {
            let err = service
                .generate_report(msisdn, "2025-02-01T00:00:00", "2025-02-28T23:59:59")
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "accepted {:?}", msisdn);
        }

        assert!(!reports_dir.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_report_rows() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;

        let report = service
            .generate_report("79991112233", "2025-02-01T00:00:00", "2025-02-28T23:59:59")
            .await
            .unwrap();

        assert_eq!(report.records, 2);
        let file_name = report.path.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(file_name, format!("79991112233_{}.csv", report.id));

        let content = std::fs::read_to_string(&report.path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "01,79991112233,79992221122,2025-02-10T12:00:00,2025-02-10T12:02:05",
                "02,79993332211,79991112233,2025-02-10T14:00:00,2025-02-10T14:00:30",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_period_writes_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let reports_dir = dir.path().join("nested");
        let service = service(&reports_dir).await;

        let report = service
            .generate_report("79991112233", "2024-01-01T00:00:00", "2024-01-31T23:59:59")
            .await
            .unwrap();

        assert_eq!(report.records, 0);
        assert_eq!(std::fs::read_to_string(&report.path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_find_for_subscriber() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path()).await;
        let start = Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap();

        let found = service
            .find_for_subscriber("79993332211", start, start + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }
}
