pub mod builder;

pub use builder::PublisherConfigBuilder;

use crate::error::{PublisherError, PublisherResult};
use crate::logger::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding [`PublisherConfig::log_level`]
pub const LOG_LEVEL_ENV: &str = "PUBLISHER_LOG_LEVEL";

/// Engine configuration
///
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```json
/// { "logLevel": "debug", "skipSucceeded": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PublisherConfig {
    /// Lowest level the manager forwards to its log sink
    pub log_level: LogLevel,

    /// Entries kept by an in-memory log pane
    pub log_capacity: usize,

    /// Leave processes that already succeeded alone on the next publish
    pub skip_succeeded: bool,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_capacity: 1000,
            skip_succeeded: false,
        }
    }
}

impl PublisherConfig {
    pub fn builder() -> PublisherConfigBuilder {
        PublisherConfigBuilder::new()
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> PublisherResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> PublisherResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> PublisherResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> PublisherResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = LogLevel::from_str(&level).ok_or_else(|| {
                PublisherError::ConfigError(format!("{} has an unknown level: {}", LOG_LEVEL_ENV, level))
            })?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> PublisherResult<()> {
        if self.log_capacity == 0 {
            return Err(PublisherError::ConfigError(
                "logCapacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
