//! Configuration management for the soulsig engine.

mod sub_configs;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use sub_configs::{IndexConfig, InferenceConfig, LoggingConfig, MatchingConfig};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{SOULSIG_ENV}.toml (environment-specific)
    /// 3. Environment variables with SOULSIG_ prefix
    pub fn load() -> CoreResult<Self> {
        let env = std::env::var("SOULSIG_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(config::Environment::with_prefix("SOULSIG").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        tracing::debug!(%env, "configuration loaded");
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::ConfigurationError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| CoreError::ConfigurationError(format!("Failed to parse config file: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values (fail fast).
    pub fn validate(&self) -> CoreResult<()> {
        self.matching.validate()?;
        self.inference.validate()?;
        self.index.validate()?;
        Ok(())
    }
}
