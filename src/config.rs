//! Environment-driven settings.
//!
//! Values come from the process environment, after `.env` has been loaded by
//! the binary. CLI flags override them per invocation.

use std::time::Duration;

pub const DEFAULT_LOG_FILE_PATH: &str = "logs/giro_report.log";
pub const DEFAULT_SUMMARY_PATH: &str = "summary.csv";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_file_path: String,
    /// CSV file run summaries are appended to.
    pub summary_path: String,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_file_path: DEFAULT_LOG_FILE_PATH.to_string(),
            summary_path: DEFAULT_SUMMARY_PATH.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset, empty or
    /// unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            log_file_path: get("LOG_FILE_PATH").unwrap_or(defaults.log_file_path),
            summary_path: get("GIRO_SUMMARY_PATH").unwrap_or(defaults.summary_path),
            http_timeout: get("GIRO_HTTP_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        }
    }
}
