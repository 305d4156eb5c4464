//! Repository traits for the subscriber directory and the record store
//!
//! The generator only appends to the record store and the aggregator only
//! reads from it; neither holds state beyond a single call.

use crate::error::AppError;
use crate::models::{Cdr, Subscriber};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Subscriber directory storage
#[async_trait]
pub trait SubscriberRepository: Send + Sync {
    /// List every subscriber, ordered by id
    async fn list_all(&self) -> Result<Vec<Subscriber>, AppError>;

    /// Insert the given numbers only when the directory is empty
    ///
    /// Returns the number of subscribers created.
    async fn seed_if_empty(&self, msisdns: &[String]) -> Result<usize, AppError>;

    /// Count subscribers
    async fn count(&self) -> Result<i64, AppError>;
}

/// Append-only call record storage
#[async_trait]
pub trait CdrRepository: Send + Sync {
    /// Persist a batch of records atomically
    ///
    /// Returns the number of records written.
    async fn append_batch(&self, records: &[Cdr]) -> Result<usize, AppError>;

    /// Records where the number is caller or callee, started in `[start, end)`
    async fn find_by_participant_and_time_range(
        &self,
        msisdn: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Cdr>, AppError>;

    /// All records started in `[start, end)`
    async fn find_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Cdr>, AppError>;

    /// Count stored records
    async fn count(&self) -> Result<i64, AppError>;
}
