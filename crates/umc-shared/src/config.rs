//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::constants::{DEFAULT_BASE_URL, DEFAULT_STORAGE_DIR, DEFAULT_TIMEOUT_SECONDS, PERSIST_KEY};
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub dir: PathBuf,
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
    /// Directory for the rolling log file; console only when unset.
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Layered load: defaults, `config/default`, `config/{UMC_ENV}`, then
    /// `UMC__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("UMC_ENV").unwrap_or_else(|_| "development".into());
        let config: Self = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        config.validate()
    }

    /// Loads defaults overlaid with a single explicit file.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        Self::from_file(path, Self::environment())
    }

    fn from_file(path: &str, env: Environment) -> Result<Self, AppError> {
        let config: Self = Self::builder()?
            .add_source(File::with_name(path).required(true))
            .add_source(env)
            .build()?
            .try_deserialize()?;
        config.validate()
    }

    /// `UMC__SECTION__KEY` overrides.
    fn environment() -> Environment {
        Environment::with_prefix("UMC").separator("__").try_parsing(true)
    }

    fn validate(self) -> Result<Self, AppError> {
        if self.api.base_url.trim().is_empty() {
            return Err(AppError::InvalidSetting("api.base_url must not be empty".into()));
        }
        if self.api.timeout_seconds == 0 {
            return Err(AppError::InvalidSetting("api.timeout_seconds must be positive".into()));
        }
        if self.storage.key.is_empty() {
            return Err(AppError::InvalidSetting("storage.key must not be empty".into()));
        }
        Ok(self)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("api.base_url", DEFAULT_BASE_URL)?
            .set_default("api.timeout_seconds", DEFAULT_TIMEOUT_SECONDS)?
            .set_default("storage.dir", DEFAULT_STORAGE_DIR)?
            .set_default("storage.key", PERSIST_KEY)?
            .set_default("log.level", "info")?
            .set_default("log.json", false)
    }
}
