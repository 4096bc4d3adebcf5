//! # configs
//!
//! Typed runtime configuration, loaded from the process environment with
//! optional `.env` support for local runs. Credentials stay wrapped in
//! `SecretString` so they never land in debug output.

use config::{Config, Environment};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Invalid(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub github: GithubConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Delay before transient replies (and the messages they answer) are
    /// deleted, in milliseconds.
    #[serde(default = "default_cleanup_delay_ms")]
    pub cleanup_delay_ms: u64,
    /// Abandoned registration conversations expire after this many seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Long-poll timeout for the update loop, in seconds.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct TelegramConfig {
    pub token: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct GithubConfig {
    pub token: SecretString,
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_cleanup_delay_ms() -> u64 {
    1800
}

fn default_session_ttl_secs() -> u64 {
    900
}

fn default_poll_timeout_secs() -> u64 {
    50
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_database_path() -> String {
    "static/db.sqlite3".to_string()
}

impl AppConfig {
    /// Loads configuration from the environment (`APP` prefix, `__`
    /// separator), reading a local `.env` file first when one exists.
    ///
    /// `APP__TELEGRAM__TOKEN` and `APP__GITHUB__TOKEN` are the two required
    /// settings; everything else has a default.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
