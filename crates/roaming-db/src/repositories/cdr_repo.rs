//! CDR (Call Detail Record) repository implementation
//!
//! Provides PostgreSQL-backed append-only storage for call detail records
//! with range queries over the call start time. Uses runtime queries (not
//! compile-time macros) to avoid requiring a database connection at build
//! time.

use roaming_core::{
    models::{CallDirection, Cdr},
    traits::CdrRepository,
    AppError, AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, error, instrument};

/// PostgreSQL implementation of CdrRepository
pub struct PgCdrRepository {
    pool: PgPool,
}

impl PgCdrRepository {
    /// Create a new CDR repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const CDR_SELECT_COLUMNS: &str = r#"
    id, call_type, msisdn, other_msisdn, call_start_time, call_end_time
"#;

#[async_trait]
impl CdrRepository for PgCdrRepository {
    #[instrument(skip(self, records), fields(batch = records.len()))]
    async fn append_batch(&self, records: &[Cdr]) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        debug!("Appending {} CDRs", records.len());

        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO cdr (call_type, msisdn, other_msisdn, call_start_time, call_end_time) ",
        );
        builder.push_values(records, |mut row, cdr| {
            row.push_bind(cdr.direction.code())
                .push_bind(cdr.caller_number.as_str())
                .push_bind(cdr.callee_number.as_str())
                .push_bind(cdr.start_time)
                .push_bind(cdr.end_time);
        });

        let result = builder.build().execute(&mut *tx).await.map_err(|e| {
            error!("Database error appending CDR batch: {}", e);
            AppError::Database(format!("Failed to append CDRs: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            error!("Failed to commit CDR batch: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        Ok(result.rows_affected() as usize)
    }

    #[instrument(skip(self))]
    async fn find_by_participant_and_time_range(
        &self,
        msisdn: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Cdr>> {
        debug!("Finding CDRs for {} between {} and {}", msisdn, start, end);

        let query = format!(
            r#"
            SELECT {} FROM cdr
            WHERE (msisdn = $1 OR other_msisdn = $1)
              AND call_start_time >= $2
              AND call_start_time < $3
            ORDER BY call_start_time, id
            "#,
            CDR_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<Postgres, CdrRow>(&query)
            .bind(msisdn)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding CDRs for {}: {}", msisdn, e);
                AppError::Database(format!("Failed to fetch CDRs: {}", e))
            })?;

        rows.into_iter().map(Cdr::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Cdr>> {
        debug!("Finding CDRs between {} and {}", start, end);

        let query = format!(
            r#"
            SELECT {} FROM cdr
            WHERE call_start_time >= $1 AND call_start_time < $2
            ORDER BY call_start_time, id
            "#,
            CDR_SELECT_COLUMNS
        );

        let rows = sqlx::query_as::<Postgres, CdrRow>(&query)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error finding CDRs by time range: {}", e);
                AppError::Database(format!("Failed to fetch CDRs: {}", e))
            })?;

        rows.into_iter().map(Cdr::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cdr")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting CDRs: {}", e);
                AppError::Database(format!("Failed to count CDRs: {}", e))
            })?;

        Ok(result.0)
    }
}

/// Helper struct for mapping database rows to domain model
#[derive(Debug, sqlx::FromRow)]
struct CdrRow {
    id: i64,
    call_type: String,
    msisdn: String,
    other_msisdn: String,
    call_start_time: DateTime<Utc>,
    call_end_time: DateTime<Utc>,
}

impl TryFrom<CdrRow> for Cdr {
    type Error = AppError;

    fn try_from(row: CdrRow) -> Result<Self, Self::Error> {
        let direction = CallDirection::from_code(row.call_type.trim()).ok_or_else(|| {
            AppError::Database(format!(
                "CDR {} has unknown call type '{}'",
                row.id, row.call_type
            ))
        })?;

        Ok(Self {
            id: row.id,
            direction,
            caller_number: row.msisdn,
            callee_number: row.other_msisdn,
            start_time: row.call_start_time,
            end_time: row.call_end_time,
        })
    }
}
