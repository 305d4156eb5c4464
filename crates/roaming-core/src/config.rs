//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Subscriber numbers seeded into an empty directory
pub const DEFAULT_MSISDNS: [&str; 10] = [
    "79991112233",
    "79992221122",
    "79993332211",
    "79994443322",
    "79995554433",
    "79996665544",
    "79997776655",
    "79998887766",
    "79999998877",
    "79990009988",
];

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma separated list of allowed CORS origins
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "http://localhost:3000,http://127.0.0.1:3000".to_string()
}

/// Record store backend
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL through sqlx
    #[default]
    Postgres,
    /// Process-local store, lost on restart
    Memory,
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Which record store to use
    #[serde(default)]
    pub backend: StorageBackend,

    /// PostgreSQL connection URL (unused by the memory backend)
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Apply embedded migrations at startup
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

/// Call record generation settings
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    /// Generate a year of records when the process starts
    #[serde(default = "default_true")]
    pub run_on_startup: bool,

    /// Records per persisted batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Mean gap between call attempts in seconds
    #[serde(default = "default_mean_interval")]
    pub mean_interval_secs: f64,

    /// Mean call length in seconds
    #[serde(default = "default_mean_duration")]
    pub mean_duration_secs: f64,

    /// Length of the generated history in calendar months
    #[serde(default = "default_window_months")]
    pub window_months: u32,

    /// Fixed RNG seed for reproducible runs
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_batch_size() -> usize {
    100
}

fn default_mean_interval() -> f64 {
    3600.0
}

fn default_mean_duration() -> f64 {
    600.0
}

fn default_window_months() -> u32 {
    12
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            run_on_startup: true,
            batch_size: default_batch_size(),
            mean_interval_secs: default_mean_interval(),
            mean_duration_secs: default_mean_duration(),
            window_months: default_window_months(),
            seed: None,
        }
    }
}

/// Subscriber directory settings
#[derive(Debug, Deserialize, Clone)]
pub struct DirectoryConfig {
    /// Numbers inserted when the directory is empty
    #[serde(default = "default_seed_msisdns")]
    pub seed_msisdns: Vec<String>,
}

fn default_seed_msisdns() -> Vec<String> {
    DEFAULT_MSISDNS.iter().map(|s| s.to_string()).collect()
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            seed_msisdns: default_seed_msisdns(),
        }
    }
}

/// CSV report output settings
#[derive(Debug, Deserialize, Clone)]
pub struct ReportsConfig {
    /// Directory CSV reports are written to
    #[serde(default = "default_reports_dir")]
    pub dir: String,
}

fn default_reports_dir() -> String {
    "reports".to_string()
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: default_reports_dir(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.backend", "postgres")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.run_migrations", true)?
            .set_default("generator.run_on_startup", true)?
            .set_default("generator.batch_size", 100)?
            .set_default("generator.mean_interval_secs", 3600.0)?
            .set_default("generator.mean_duration_secs", 600.0)?
            .set_default("generator.window_months", 12)?
            .set_default("reports.dir", "reports")?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with ROAMING_ prefix
            .add_source(
                Environment::with_prefix("ROAMING")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("directory.seed_msisdns")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("ROAMING").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_generator_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.mean_interval_secs, 3600.0);
        assert_eq!(config.mean_duration_secs, 600.0);
        assert_eq!(config.window_months, 12);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_default_directory() {
        let config = DirectoryConfig::default();
        assert_eq!(config.seed_msisdns.len(), 10);
        assert_eq!(config.seed_msisdns[0], "79991112233");
    }

    #[test]
    fn test_storage_backend_deserialize() {
        let backend: StorageBackend = serde_json::from_str("\"memory\"").unwrap();
        assert_eq!(backend, StorageBackend::Memory);
        assert_eq!(StorageBackend::default(), StorageBackend::Postgres);
    }
}
