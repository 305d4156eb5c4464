//! Shared application state handed to every handler

use roaming_core::{
    traits::{CdrRepository, SubscriberRepository},
    AppConfig,
};
use roaming_db::Storage;
use roaming_services::{CdrGenerator, CdrReportService, SubscriberDirectory, UsageAggregator};

/// Services wired over the configured storage backend
pub struct AppState {
    pub directory: SubscriberDirectory<dyn SubscriberRepository>,
    pub generator: CdrGenerator<dyn SubscriberRepository, dyn CdrRepository>,
    pub usage: UsageAggregator<dyn CdrRepository>,
    pub reports: CdrReportService<dyn CdrRepository>,
}

impl AppState {
    pub fn new(storage: &Storage, config: &AppConfig) -> Self {
        Self {
            directory: SubscriberDirectory::new(
                storage.subscribers.clone(),
                config.directory.seed_msisdns.clone(),
            ),
            generator: CdrGenerator::new(
                storage.subscribers.clone(),
                storage.cdrs.clone(),
                config.generator.clone(),
            ),
            usage: UsageAggregator::new(storage.cdrs.clone()),
            reports: CdrReportService::new(storage.cdrs.clone(), config.reports.dir.as_str()),
        }
    }
}
