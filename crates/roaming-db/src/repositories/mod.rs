//! Repository implementations
//!
//! Concrete implementations of the repository traits defined in
//! roaming-core: PostgreSQL through sqlx, plus process-local stores.

pub mod cdr_repo;
pub mod memory;
pub mod subscriber_repo;

pub use cdr_repo::PgCdrRepository;
pub use memory::{InMemoryCdrRepository, InMemorySubscriberRepository};
pub use subscriber_repo::PgSubscriberRepository;
