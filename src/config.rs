use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::{NutriError, Result};
use crate::planner::constants::DEFAULT_SAMPLE_SIZE;
use crate::source::FetchPolicy;

pub const DEFAULT_CONFIG_PATH: &str = "nutriplan.toml";
pub const CONFIG_PATH_ENV: &str = "NUTRIPLAN_CONFIG";
const ENV_PREFIX: &str = "NUTRIPLAN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recipe corpus client settings.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default)]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            sample_size: default_sample_size(),
            max_retries: 0,
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_retry_backoff_ms() -> u64 {
    500
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_local_retention_days")]
    pub local_retention_days: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            local_retention_days: default_local_retention_days(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("nutriplan_data")
}

fn default_local_retention_days() -> u32 {
    7
}

impl StorageConfig {
    pub fn local_store_path(&self) -> PathBuf {
        self.data_dir.join("local_suggestions.json")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Settings {
    /// Load settings from defaults, an optional TOML file, then the environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (`NUTRIPLAN__SOURCE__BASE_URL`, ...)
    /// 2. Config file at `config_path`, `$NUTRIPLAN_CONFIG`, or `nutriplan.toml`
    /// 3. Built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .or_else(|| env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut builder = ConfigBuilder::builder();
        if path.exists() {
            builder = builder.add_source(File::from(path.as_path()));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.base_url.trim().is_empty() {
            return Err(NutriError::InvalidInput("source.base_url must not be empty".to_string()));
        }
        if self.source.timeout_secs == 0 {
            return Err(NutriError::InvalidInput("source.timeout_secs must be greater than 0".to_string()));
        }
        if self.source.sample_size == 0 {
            return Err(NutriError::InvalidInput("source.sample_size must be greater than 0".to_string()));
        }
        Ok(())
    }

    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            sample_size: self.source.sample_size,
            timeout: self.source_timeout(),
            max_retries: self.source.max_retries,
            retry_backoff: Duration::from_millis(self.source.retry_backoff_ms),
        }
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.source.sample_size, 50);
        assert_eq!(settings.source.max_retries, 0);
        assert_eq!(settings.storage.local_retention_days, 7);
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut settings = Settings::default();
        settings.source.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_zero_sample_size() {
        let mut settings = Settings::default();
        settings.source.sample_size = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_empty_base_url() {
        let mut settings = Settings::default();
        settings.source.base_url = "  ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nutriplan.toml");
        std::fs::write(
            &path,
            r#"
[source]
base_url = "http://recipes.test"
sample_size = 20
max_retries = 2

[storage]
local_retention_days = 3
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.source.base_url, "http://recipes.test");
        assert_eq!(settings.source.sample_size, 20);
        assert_eq!(settings.source.timeout_secs, 10);
        assert_eq!(settings.storage.local_retention_days, 3);

        let policy = settings.fetch_policy();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[source]\nsample_size = 0\n").unwrap();

        assert!(Settings::load(Some(&path)).is_err());
    }
}
