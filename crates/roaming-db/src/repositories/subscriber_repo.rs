//! Subscriber repository implementation
//!
//! PostgreSQL-backed subscriber directory. The directory is seeded once and
//! then only read.

use roaming_core::{models::Subscriber, traits::SubscriberRepository, AppError, AppResult};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, error, info, instrument};

/// PostgreSQL implementation of SubscriberRepository
pub struct PgSubscriberRepository {
    pool: PgPool,
}

impl PgSubscriberRepository {
    /// Create a new subscriber repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriberRepository for PgSubscriberRepository {
    #[instrument(skip(self))]
    async fn list_all(&self) -> AppResult<Vec<Subscriber>> {
        let rows = sqlx::query_as::<sqlx::Postgres, SubscriberRow>(
            "SELECT id, msisdn FROM subscriber ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Database error listing subscribers: {}", e);
            AppError::Database(format!("Failed to list subscribers: {}", e))
        })?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    #[instrument(skip(self, msisdns), fields(count = msisdns.len()))]
    async fn seed_if_empty(&self, msisdns: &[String]) -> AppResult<usize> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            AppError::Transaction(format!("Failed to start transaction: {}", e))
        })?;

        // Serialize concurrent seeders on the table itself
        sqlx::query("LOCK TABLE subscriber IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to lock subscriber table: {}", e)))?;

        let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriber")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| AppError::Database(format!("Failed to count subscribers: {}", e)))?;

        if existing.0 > 0 {
            debug!("Subscriber directory already holds {} entries", existing.0);
            return Ok(0);
        }

        let mut created = 0;
        for msisdn in msisdns {
            let result = sqlx::query(
                "INSERT INTO subscriber (msisdn) VALUES ($1) ON CONFLICT (msisdn) DO NOTHING",
            )
            .bind(msisdn)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("Database error seeding subscriber {}: {}", msisdn, e);
                AppError::Database(format!("Failed to seed subscriber: {}", e))
            })?;
            created += result.rows_affected() as usize;
        }

        tx.commit().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            AppError::Transaction(format!("Failed to commit transaction: {}", e))
        })?;

        info!("Seeded {} subscribers", created);

        Ok(created)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> AppResult<i64> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subscriber")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Database error counting subscribers: {}", e);
                AppError::Database(format!("Failed to count subscribers: {}", e))
            })?;

        Ok(result.0)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriberRow {
    id: i64,
    msisdn: String,
}

impl From<SubscriberRow> for Subscriber {
    fn from(row: SubscriberRow) -> Self {
        Self {
            id: row.id,
            msisdn: row.msisdn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_row_conversion() {
        let subscriber: Subscriber = SubscriberRow {
            id: 7,
            msisdn: "79997776655".to_string(),
        }
        .into();

        assert_eq!(subscriber.id, 7);
        assert_eq!(subscriber.msisdn, "79997776655");
    }
}
