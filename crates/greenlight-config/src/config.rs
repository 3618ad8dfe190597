//! Root configuration type.

use greenlight_validator::{permitted_value, Validator};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, DbConfig, LogFormat, LoggingConfig, ServerConfig, ENVIRONMENTS};

/// Complete Greenlight server configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to assemble it from files,
/// environment variables and command-line overrides.
///
/// # Example
///
/// ```
/// use greenlight_config::GreenlightConfig;
///
/// let config = GreenlightConfig::default();
/// assert_eq!(config.server.port, 4000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct GreenlightConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    #[serde(default)]
    pub db: DbConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GreenlightConfig {
    /// Validate the configuration.
    ///
    /// Every rule is checked; the error lists all failing fields.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if any rule fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut v = Validator::new();

        v.check(self.server.port != 0, "server.port", "must not be 0");
        v.check(
            permitted_value(&self.server.env.as_str(), &ENVIRONMENTS),
            "server.env",
            "must be development, staging or production",
        );
        v.check(
            self.server.read_timeout_secs > 0,
            "server.read_timeout_secs",
            "must be greater than zero",
        );
        v.check(
            self.server.write_timeout_secs > 0,
            "server.write_timeout_secs",
            "must be greater than zero",
        );
        v.check(
            !self.logging.level.trim().is_empty(),
            "logging.level",
            "must be provided",
        );

        if v.valid() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(v.into_errors()))
        }
    }

    /// Development preset: pretty debug logging.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.env = "development".to_string();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config
    }

    /// Production preset: JSON info logging.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.server.env = "production".to_string();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }
}
