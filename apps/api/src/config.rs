use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::i18n::Locale;

/// Application configuration loaded from environment variables.
/// Everything has a default: the service runs on local files with the mock analyzer.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_dir: PathBuf,
    /// When set, audit state goes to Postgres instead of `storage_dir`.
    pub database_url: Option<String>,
    /// When set, job analysis is forwarded to this service instead of the mock.
    pub analysis_url: Option<String>,
    /// `None` means no client-side timeout on analysis calls.
    pub analysis_timeout: Option<Duration>,
    pub default_locale: Locale,
    /// Upper bound on in-memory sessions before idle ones are dropped.
    pub session_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let analysis_timeout = optional_env("ANALYSIS_TIMEOUT_SECS")
            .map(|v| {
                v.parse::<u64>()
                    .context("ANALYSIS_TIMEOUT_SECS must be a whole number of seconds")
            })
            .transpose()?
            .map(Duration::from_secs);

        let default_locale = optional_env("DEFAULT_LOCALE")
            .map(|v| v.parse::<Locale>().map_err(anyhow::Error::msg))
            .transpose()
            .context("DEFAULT_LOCALE must be 'fr' or 'en'")?
            .unwrap_or_default();

        let session_capacity = optional_env("SESSION_CAPACITY")
            .map(|v| {
                v.parse::<usize>()
                    .context("SESSION_CAPACITY must be a positive whole number")
            })
            .transpose()?
            .unwrap_or(1024);

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            storage_dir: optional_env("STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            database_url: optional_env("DATABASE_URL"),
            analysis_url: optional_env("ANALYSIS_URL"),
            analysis_timeout,
            default_locale,
            session_capacity,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
