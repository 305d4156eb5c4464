//! Process-local repositories
//!
//! Used by the `memory` storage backend and by tests. Contents are lost when
//! the process exits. Each batch is appended under a single write lock, so
//! readers see either all or none of it.

use roaming_core::{
    models::{Cdr, Subscriber},
    traits::{CdrRepository, SubscriberRepository},
    AppResult,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

/// In-memory subscriber directory
#[derive(Default)]
pub struct InMemorySubscriberRepository {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl InMemorySubscriberRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriberRepository for InMemorySubscriberRepository {
    async fn list_all(&self) -> AppResult<Vec<Subscriber>> {
        Ok(self.subscribers.read().clone())
    }

    async fn seed_if_empty(&self, msisdns: &[String]) -> AppResult<usize> {
        let mut subscribers = self.subscribers.write();
        if !subscribers.is_empty() {
            debug!("Subscriber directory already holds {} entries", subscribers.len());
            return Ok(0);
        }

        for msisdn in msisdns {
            if subscribers.iter().any(|s| &s.msisdn == msisdn) {
                continue;
            }
            let id = subscribers.len() as i64 + 1;
            subscribers.push(Subscriber {
                id,
                msisdn: msisdn.clone(),
            });
        }

        info!("Seeded {} subscribers", subscribers.len());
        Ok(subscribers.len())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.subscribers.read().len() as i64)
    }
}

/// In-memory append-only call record store
#[derive(Default)]
pub struct InMemoryCdrRepository {
    records: RwLock<Vec<Cdr>>,
}

impl InMemoryCdrRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored record in insertion order
    pub fn snapshot(&self) -> Vec<Cdr> {
        self.records.read().clone()
    }

    fn select<F>(&self, predicate: F) -> Vec<Cdr>
    where
        F: Fn(&Cdr) -> bool,
    {
        let mut found: Vec<Cdr> = self
            .records
            .read()
            .iter()
            .filter(|cdr| predicate(cdr))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        found
    }
}

#[async_trait]
impl CdrRepository for InMemoryCdrRepository {
    async fn append_batch(&self, records: &[Cdr]) -> AppResult<usize> {
        let mut stored = self.records.write();
        let next_id = stored.len() as i64 + 1;

        stored.extend(records.iter().enumerate().map(|(offset, cdr)| Cdr {
            id: next_id + offset as i64,
            ..cdr.clone()
        }));

        Ok(records.len())
    }

    async fn find_by_participant_and_time_range(
        &self,
        msisdn: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Cdr>> {
        Ok(self.select(|cdr| {
            cdr.involves(msisdn) && cdr.start_time >= start && cdr.start_time < end
        }))
    }

    async fn find_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Cdr>> {
        Ok(self.select(|cdr| cdr.start_time >= start && cdr.start_time < end))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.records.read().len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use roaming_core::models::CallDirection;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 10, hour, 0, 0).unwrap()
    }

    fn call(caller: &str, callee: &str, hour: u32) -> Cdr {
        Cdr::new(
            CallDirection::Outgoing,
            caller,
            callee,
            at(hour),
            at(hour) + Duration::seconds(30),
        )
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let repo = InMemorySubscriberRepository::new();
        let numbers = vec!["111".to_string(), "222".to_string(), "111".to_string()];

        assert_eq!(repo.seed_if_empty(&numbers).await.unwrap(), 2);
        assert_eq!(repo.seed_if_empty(&numbers).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 2);

        let all = repo.list_all().await.unwrap();
        assert_eq!(all[0].id, 1);
        assert_eq!(all[1].msisdn, "222");
    }

    #[tokio::test]
    async fn test_append_assigns_ids() {
        let repo = InMemoryCdrRepository::new();
        repo.append_batch(&[call("A", "B", 1), call("B", "C", 2)])
            .await
            .unwrap();
        repo.append_batch(&[call("C", "A", 3)]).await.unwrap();

        let ids: Vec<i64> = repo.snapshot().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_participant_query_matches_either_side() {
        let repo = InMemoryCdrRepository::new();
        repo.append_batch(&[call("B", "C", 5), call("A", "B", 2), call("C", "D", 3)])
            .await
            .unwrap();

        let found = repo
            .find_by_participant_and_time_range("B", at(0), at(23))
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].start_time, at(2));
        assert_eq!(found[1].start_time, at(5));
    }

    #[tokio::test]
    async fn test_time_range_is_half_open() {
        let repo = InMemoryCdrRepository::new();
        repo.append_batch(&[call("A", "B", 1), call("A", "B", 2), call("A", "B", 3)])
            .await
            .unwrap();

        let found = repo.find_by_time_range(at(1), at(3)).await.unwrap();
        let hours: Vec<DateTime<Utc>> = found.iter().map(|c| c.start_time).collect();
        assert_eq!(hours, vec![at(1), at(2)]);
    }
}
