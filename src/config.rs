//! Configuration management for the library reports service

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Loan period used when none is configured or the configured one is unusable
pub const DEFAULT_DUE_DAYS: i64 = 7;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Base URL of the loan store REST API
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoansConfig {
    pub default_due_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    pub export_filename: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Directory for the daily rolling log file; console only when unset
    #[serde(default)]
    pub directory: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub loans: LoansConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. LIBRARY_STORE__TIMEOUT_SECS
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("store.url", env::var("LOAN_STORE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl LoansConfig {
    /// Configured loan period, falling back to the default for non-positive values
    pub fn due_days(&self) -> i64 {
        if self.default_due_days > 0 {
            self.default_due_days
        } else {
            DEFAULT_DUE_DAYS
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LoansConfig {
    fn default() -> Self {
        Self {
            default_due_days: DEFAULT_DUE_DAYS,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            export_filename: "library-history.csv".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}
