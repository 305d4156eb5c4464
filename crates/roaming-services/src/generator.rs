//! Call record synthesizer
//!
//! Walks a virtual clock across a historical window, placing random calls
//! between subscribers. Call gaps and call lengths are exponentially
//! distributed. A subscriber can only be party to one call at a time: an
//! attempt that involves a busy subscriber is dropped, not delayed.
//!
//! Records are accumulated in a [`CdrBatch`] and appended to the record store
//! whenever the batch fills, plus once more at the end of the run.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roaming_core::{
    config::GeneratorConfig,
    models::{CallDirection, Cdr, Subscriber},
    time::TimeWindow,
    traits::{CdrRepository, SubscriberRepository},
    AppError, AppResult,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Upper bound for the configured means, ten years in seconds
const MAX_MEAN_SECS: f64 = 315_360_000.0;

/// Largest batch a single insert can carry: Postgres caps a statement at
/// 65535 bind parameters and each record binds five
pub const MAX_BATCH_SIZE: usize = 65_535 / 5;

/// Counters reported by a generation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationStats {
    /// Call attempts placed on the virtual clock
    pub attempts: u64,
    /// Attempts dropped because a party was already on a call
    pub dropped_busy: u64,
    /// Records appended to the store
    pub records: u64,
    /// Batches appended to the store
    pub batches: u64,
}

/// Pending records waiting to be appended
#[derive(Debug)]
pub struct CdrBatch {
    records: Vec<Cdr>,
    capacity: usize,
}

impl CdrBatch {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a record; returns true once the batch is full
    pub fn push(&mut self, cdr: Cdr) -> bool {
        self.records.push(cdr);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Append the pending records to the store and clear the batch
    ///
    /// An empty batch is not sent. On failure the records stay pending.
    pub async fn flush<C>(&mut self, store: &C) -> AppResult<usize>
    where
        C: CdrRepository + ?Sized,
    {
        if self.records.is_empty() {
            return Ok(0);
        }

        let written = store.append_batch(&self.records).await?;
        self.records.clear();
        Ok(written)
    }
}

/// Draw an exponentially distributed number of whole seconds
///
/// Uses inverse transform sampling: `-ln(1 - U) * mean` with `U` in `[0, 1)`.
pub fn exponential_seconds<R>(rng: &mut R, mean_secs: f64) -> i64
where
    R: Rng + ?Sized,
{
    let u: f64 = rng.gen();
    (-(1.0 - u).ln() * mean_secs) as i64
}

/// Synthesizes call records for the subscriber directory
pub struct CdrGenerator<S, C>
where
    S: SubscriberRepository + ?Sized,
    C: CdrRepository + ?Sized,
{
    subscribers: Arc<S>,
    cdrs: Arc<C>,
    config: GeneratorConfig,
    running: Mutex<()>,
}

impl<S, C> CdrGenerator<S, C>
where
    S: SubscriberRepository + ?Sized,
    C: CdrRepository + ?Sized,
{
    /// Create a new generator
    pub fn new(subscribers: Arc<S>, cdrs: Arc<C>, config: GeneratorConfig) -> Self {
        Self {
            subscribers,
            cdrs,
            config,
            running: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the configured history ending now for every subscriber
    ///
    /// Only one run executes at a time; a concurrent trigger fails with
    /// [`AppError::Conflict`].
    #[instrument(skip(self))]
    pub async fn run_generation(&self) -> AppResult<GenerationStats> {
        let _guard = self.running.try_lock().map_err(|_| {
            warn!("Generation requested while a run is in progress");
            AppError::Conflict("CDR generation is already running".to_string())
        })?;

        let subscribers = self.subscribers.list_all().await?;
        let window = TimeWindow::months_ending_at(Utc::now(), self.config.window_months);

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        self.generate_in_window(&subscribers, window, &mut rng).await
    }

    /// Generate records for `subscribers` with start times inside `window`
    ///
    /// Fails with [`AppError::Configuration`] before anything is persisted
    /// when fewer than two distinct numbers are available. A store failure
    /// ends the run; batches appended before it are kept.
    #[instrument(skip(self, subscribers, rng), fields(subscribers = subscribers.len()))]
    pub async fn generate_in_window<R>(
        &self,
        subscribers: &[Subscriber],
        window: TimeWindow,
        rng: &mut R,
    ) -> AppResult<GenerationStats>
    where
        R: Rng + ?Sized,
    {
        self.validate_settings()?;
        let numbers = distinct_numbers(subscribers)?;

        info!(
            "Generating CDRs for {} subscribers from {} to {}",
            numbers.len(),
            window.start,
            window.end
        );

        let mut stats = GenerationStats::default();
        let mut batch = CdrBatch::new(self.config.batch_size);
        let mut busy_until: HashMap<&str, DateTime<Utc>> = HashMap::new();
        let mut t = window.start;

        loop {
            let gap = exponential_seconds(rng, self.config.mean_interval_secs).max(1);
            t += Duration::seconds(gap);
            if t >= window.end {
                break;
            }
            stats.attempts += 1;

            let caller_idx = rng.gen_range(0..numbers.len());
            let mut callee_idx = rng.gen_range(0..numbers.len());
            while callee_idx == caller_idx {
                callee_idx = rng.gen_range(0..numbers.len());
            }
            let caller = numbers[caller_idx];
            let callee = numbers[callee_idx];

            let busy = [caller, callee]
                .iter()
                .any(|msisdn| busy_until.get(msisdn).is_some_and(|until| *until > t));
            if busy {
                stats.dropped_busy += 1;
                continue;
            }

            let duration = exponential_seconds(rng, self.config.mean_duration_secs).max(1);
            let end = t + Duration::seconds(duration);
            busy_until.insert(caller, end);
            busy_until.insert(callee, end);

            let direction = if rng.gen_bool(0.5) {
                CallDirection::Outgoing
            } else {
                CallDirection::Incoming
            };

            let cdr = Cdr::new(direction, caller, callee, t, end);
            debug_assert!(cdr.is_consistent());

            if batch.push(cdr) {
                self.flush(&mut batch, &mut stats).await?;
            }
        }

        self.flush(&mut batch, &mut stats).await?;

        info!(
            "Generation finished: {} records in {} batches, {} of {} attempts dropped as busy",
            stats.records, stats.batches, stats.dropped_busy, stats.attempts
        );

        Ok(stats)
    }

    async fn flush(&self, batch: &mut CdrBatch, stats: &mut GenerationStats) -> AppResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let pending = batch.len();
        let written = batch.flush(self.cdrs.as_ref()).await.map_err(|e| {
            error!("Failed to persist batch of {} CDRs: {}", pending, e);
            e
        })?;

        stats.records += written as u64;
        stats.batches += 1;
        debug!("Persisted batch {} ({} CDRs)", stats.batches, written);

        Ok(())
    }

    fn validate_settings(&self) -> AppResult<()> {
        if self.config.batch_size == 0 || self.config.batch_size > MAX_BATCH_SIZE {
            return Err(AppError::Configuration(format!(
                "generator.batch_size must be in [1, {}], got {}",
                MAX_BATCH_SIZE, self.config.batch_size
            )));
        }

        for (name, mean) in [
            ("mean_interval_secs", self.config.mean_interval_secs),
            ("mean_duration_secs", self.config.mean_duration_secs),
        ] {
            if !(mean > 0.0 && mean <= MAX_MEAN_SECS) {
                return Err(AppError::Configuration(format!(
                    "generator.{} must be in (0, {}], got {}",
                    name, MAX_MEAN_SECS, mean
                )));
            }
        }

        Ok(())
    }
}

/// Unique subscriber numbers in directory order
fn distinct_numbers(subscribers: &[Subscriber]) -> AppResult<Vec<&str>> {
    if subscribers.is_empty() {
        return Err(AppError::Configuration(
            "subscriber directory is empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let numbers: Vec<&str> = subscribers
        .iter()
        .map(|s| s.msisdn.as_str())
        .filter(|msisdn| seen.insert(*msisdn))
        .collect();

    if numbers.len() < 2 {
        return Err(AppError::Configuration(
            "insufficient subscribers: at least 2 required".to_string(),
        ));
    }

    Ok(numbers)
}
