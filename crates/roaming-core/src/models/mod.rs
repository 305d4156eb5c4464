//! Domain models for the roaming CDR service
//!
//! This module contains the core domain models shared by the record store,
//! the generation and aggregation services, and the HTTP layer.

pub mod cdr;
pub mod subscriber;
pub mod usage;

pub use cdr::{CallDirection, Cdr};
pub use subscriber::Subscriber;
pub use usage::{format_duration, CallDuration, UsageSummary};
