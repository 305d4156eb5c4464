//! Subscriber directory service

use roaming_core::{models::Subscriber, traits::SubscriberRepository, AppResult};
use std::sync::Arc;
use tracing::{info, instrument};

/// Read access to the subscriber population plus one-time seeding
pub struct SubscriberDirectory<S: SubscriberRepository + ?Sized> {
    repo: Arc<S>,
    seed_msisdns: Vec<String>,
}

impl<S: SubscriberRepository + ?Sized> SubscriberDirectory<S> {
    pub fn new(repo: Arc<S>, seed_msisdns: Vec<String>) -> Self {
        Self { repo, seed_msisdns }
    }

    /// Insert the configured numbers if the directory is empty
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self) -> AppResult<usize> {
        let created = self.repo.seed_if_empty(&self.seed_msisdns).await?;
        if created > 0 {
            info!("Subscriber directory seeded with {} numbers", created);
        }
        Ok(created)
    }

    /// All subscribers ordered by id
    pub async fn list(&self) -> AppResult<Vec<Subscriber>> {
        self.repo.list_all().await
    }
}
