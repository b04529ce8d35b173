use super::PublisherConfig;
use crate::error::{PublisherError, PublisherResult};
use crate::logger::LogLevel;

/// Builder for constructing PublisherConfig instances with a fluent API
///
/// # Example
/// ```
/// use publisher_lib::config::PublisherConfigBuilder;
/// use publisher_lib::logger::LogLevel;
///
/// let config = PublisherConfigBuilder::new()
///     .log_level(LogLevel::Debug)
///     .skip_succeeded(true)
///     .build()
///     .unwrap();
/// assert!(config.skip_succeeded);
/// ```
#[derive(Debug)]
pub struct PublisherConfigBuilder {
    log_level: Option<LogLevel>,
    log_capacity: Option<usize>,
    skip_succeeded: bool,
}

impl PublisherConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            log_level: None,
            log_capacity: None,
            skip_succeeded: false,
        }
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set the log level from its name (`debug`, `info`, `warn`, `error`)
    pub fn log_level_name(mut self, name: &str) -> PublisherResult<Self> {
        let level = LogLevel::from_str(name)
            .ok_or_else(|| PublisherError::BuilderError(format!("Unknown log level: {}", name)))?;
        self.log_level = Some(level);
        Ok(self)
    }

    pub fn log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = Some(capacity);
        self
    }

    pub fn skip_succeeded(mut self, skip: bool) -> Self {
        self.skip_succeeded = skip;
        self
    }

    /// Build the PublisherConfig instance
    ///
    /// # Errors
    /// Returns `PublisherError::BuilderError` if a field is out of range
    pub fn build(self) -> PublisherResult<PublisherConfig> {
        let defaults = PublisherConfig::default();
        let log_capacity = self.log_capacity.unwrap_or(defaults.log_capacity);
        if log_capacity == 0 {
            return Err(PublisherError::BuilderError(
                "log_capacity must be greater than zero".to_string(),
            ));
        }

        Ok(PublisherConfig {
            log_level: self.log_level.unwrap_or(defaults.log_level),
            log_capacity,
            skip_succeeded: self.skip_succeeded,
        })
    }
}

impl Default for PublisherConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
