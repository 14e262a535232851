use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::query::ClassifierConfig;
use crate::core::search::SearchConfig;

/// Environment variable prefix; `__` separates nested keys
/// (`STOREFRONT_SEARCH__MAX_CONCURRENT_REQUESTS=8`).
pub const ENV_PREFIX: &str = "STOREFRONT_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Invalid(Box::new(e))
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub search: SearchConfig,
    pub vocabulary: VocabularyConfig,
    pub logging: LoggingConfig,
}

/// Seed vocabulary source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// TOML seed file; the built-in tables are used when unset or missing.
    pub seed_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Override the default log directory.
    pub log_dir: Option<PathBuf>,
    /// Write JSON logs to a daily rolling file.
    pub file_logging: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            file_logging: true,
        }
    }
}

impl LoggingConfig {
    /// Resolved log directory (override or XDG data dir).
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("storefront-query").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs"))
        })
    }
}

impl AppConfig {
    /// Layered sources: defaults, then the TOML file, then `STOREFRONT_*`
    /// environment variables.
    pub fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist; the default location
    /// (`~/.config/storefront-query/config.toml`) may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = Self::resolve_path(path)?;
        Self::log_source(&config_path);
        Self::from_path(&config_path)
    }

    /// The file `load` reads: the explicit path, which must exist, or the
    /// default location.
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        match path {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(Self::config_path()),
        }
    }

    /// Defaults layered with `config_path` (if present) and the environment.
    pub fn from_path(config_path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::figment(config_path).extract()?)
    }

    /// Report which file the configuration came from.
    pub fn log_source(config_path: &Path) {
        if config_path.exists() {
            log::info!("Loading config from {}", config_path.display());
        } else {
            log::debug!("No config file at {}, using defaults", config_path.display());
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("storefront-query").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
