//! Business logic services for the roaming CDR service
//!
//! # Services
//!
//! - `SubscriberDirectory` - subscriber listing and one-time seeding
//! - `CdrGenerator` - synthesizes a call history for the directory
//! - `UsageAggregator` - incoming/outgoing call time per subscriber (UDR)
//! - `CdrReportService` - per-subscriber CDR listing and CSV export
//!
//! The generator and the aggregator never call each other; they share only
//! the record store. Services are generic over the repository traits and
//! accept trait objects, so the HTTP layer can hold them behind `Arc`.

pub mod directory;
pub mod generator;
pub mod report;
pub mod usage;

pub use directory::SubscriberDirectory;
pub use generator::{exponential_seconds, CdrBatch, CdrGenerator, GenerationStats};
pub use report::{parse_range, CdrReport, CdrReportService};
pub use usage::UsageAggregator;
