//! Usage aggregation (UDR)
//!
//! Derives incoming/outgoing call time totals from the record store. Nothing
//! is cached or persisted; every query reads the store again.

use chrono::Utc;
use roaming_core::{
    models::UsageSummary,
    time::TimeWindow,
    traits::CdrRepository,
    AppError, AppResult,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Usage aggregator over the call record store
pub struct UsageAggregator<C: CdrRepository + ?Sized> {
    cdrs: Arc<C>,
}

impl<C: CdrRepository + ?Sized> UsageAggregator<C> {
    /// Create a new aggregator
    pub fn new(cdrs: Arc<C>) -> Self {
        Self { cdrs }
    }

    /// Usage of one subscriber for a `yyyy-MM` month, or the last year
    ///
    /// Counts every call the subscriber took part in, on either side, that
    /// started inside the window. Fails with [`AppError::NotFound`] when
    /// there is none.
    #[instrument(skip(self))]
    pub async fn get_usage(&self, msisdn: &str, month: Option<&str>) -> AppResult<UsageSummary> {
        let window = match month {
            Some(month) => TimeWindow::for_month(month)?,
            None => TimeWindow::last_year(Utc::now()),
        };

        let records = self
            .cdrs
            .find_by_participant_and_time_range(msisdn, window.start, window.end)
            .await?;

        if records.is_empty() {
            debug!("No CDRs for {} in window", msisdn);
            return Err(AppError::NotFound(format!(
                "No calls found for subscriber {} in the requested period",
                msisdn
            )));
        }

        let mut summary = UsageSummary::empty(msisdn);
        for cdr in &records {
            summary.add(cdr);
        }

        debug!(
            "Usage for {}: {} CDRs, in={}s out={}s",
            msisdn,
            records.len(),
            summary.incoming_seconds,
            summary.outgoing_seconds
        );

        Ok(summary)
    }

    /// Usage of every caller for a `yyyy-MM` month
    ///
    /// Records are grouped by their caller number and each record's own
    /// direction tag decides the bucket. A number that only ever appears as
    /// callee has no entry. An empty month yields an empty map.
    #[instrument(skip(self))]
    pub async fn get_all_usage(&self, month: &str) -> AppResult<BTreeMap<String, UsageSummary>> {
        let window = TimeWindow::for_month(month)?;

        let records = self
            .cdrs
            .find_by_time_range(window.start, window.end)
            .await?;

        let mut usage: BTreeMap<String, UsageSummary> = BTreeMap::new();
        for cdr in &records {
            usage
                .entry(cdr.caller_number.clone())
                .or_insert_with(|| UsageSummary::empty(cdr.caller_number.as_str()))
                .add(cdr);
        }

        info!(
            "Aggregated {} CDRs into {} usage reports for {}",
            records.len(),
            usage.len(),
            month
        );

        Ok(usage)
    }
}
