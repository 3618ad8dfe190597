//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, environment variables and
//! command-line overrides.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, GreenlightConfig, LogFormat};

/// Environment variable holding the database connection string.
pub const DB_DSN_ENV: &str = "GREENLIGHT_DB_DSN";

/// Default prefix for `PREFIX__SECTION__KEY` overrides.
pub const ENV_PREFIX: &str = "GREENLIGHT";

/// Values given on the command line. They are applied after every other
/// layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--port`
    pub port: Option<u16>,
    /// `--env`
    pub env: Option<String>,
    /// `--db-dsn`
    pub db_dsn: Option<String>,
}

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. `GREENLIGHT_DB_DSN`
/// 4. `PREFIX__SECTION__KEY` environment variables
/// 5. Command-line [`Overrides`]
///
/// # Example
///
/// ```no_run
/// use greenlight_config::ConfigLoader;
///
/// # fn main() -> Result<(), greenlight_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("greenlight.toml")?
///     .with_dotenv()?
///     .with_env_prefix("GREENLIGHT")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: GreenlightConfig,
    env_prefix: Option<String>,
    overrides: Overrides,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: GreenlightConfig::default(),
            env_prefix: None,
            overrides: Overrides::default(),
        }
    }

    /// Start with development preset configuration.
    ///
    /// ```
    /// use greenlight_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = GreenlightConfig::development();
        self
    }

    /// Start with production preset configuration.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = GreenlightConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format (TOML or JSON) is chosen by the file extension. Unknown
    /// fields are rejected.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, has an
    /// unsupported extension or does not parse.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        self.config = parse(&content, format)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format ("toml" or
    /// "json").
    ///
    /// ```
    /// use greenlight_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [server]
    ///     port = 8080
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.port, 8080);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, format)?;
        Ok(self)
    }

    /// Set the prefix for `PREFIX__SECTION__KEY` overrides, e.g.
    /// `GREENLIGHT__SERVER__PORT=8080`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if a `.env` file exists but is invalid.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Set command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Finalize and return the validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment override does not parse or
    /// validation fails.
    pub fn load(self) -> Result<GreenlightConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Finalize without validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment override does not parse.
    pub fn load_unvalidated(mut self) -> Result<GreenlightConfig, ConfigError> {
        if let Ok(dsn) = env::var(DB_DSN_ENV) {
            self.config.db.dsn = dsn;
        }

        if let Some(prefix) = self.env_prefix.take() {
            let marker = format!("{prefix}__");
            let vars: Vec<(String, String)> =
                env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();

            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        let overrides = std::mem::take(&mut self.overrides);
        self.apply_overrides(overrides);

        Ok(self.config)
    }

    fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(port) = overrides.port {
            self.config.server.port = port;
        }
        if let Some(env) = overrides.env {
            self.config.server.env = env;
        }
        if let Some(dsn) = overrides.db_dsn {
            self.config.db.dsn = dsn;
        }
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["SERVER", "PORT"] => {
                self.config.server.port = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected port number"))?;
            }
            ["SERVER", "ENV"] => {
                self.config.server.env = value.to_string();
            }
            ["SERVER", "READ_TIMEOUT_SECS"] => {
                self.config.server.read_timeout_secs = parse_secs(key, value)?;
            }
            ["SERVER", "WRITE_TIMEOUT_SECS"] => {
                self.config.server.write_timeout_secs = parse_secs(key, value)?;
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = parse_secs(key, value)?;
            }

            ["DB", "DSN"] => {
                self.config.db.dsn = value.to_string();
            }

            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }

            // Unknown keys are ignored so unrelated tooling can share the prefix.
            _ => {}
        }

        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<GreenlightConfig, ConfigError> {
    match format.to_lowercase().as_str() {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer seconds"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.env, "production");
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"server": {"port": 3000, "env": "staging"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.env, "staging");
    }

    #[test]
    fn test_loader_with_unsupported_format() {
        let err = ConfigLoader::new().with_string("port: 1", "yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(f) if f == "yaml"));
    }

    #[test]
    fn test_loader_with_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [server]
            port = 5000
            env = "production"
            write_timeout_secs = 5

            [db]
            dsn = "postgres://greenlight@localhost/greenlight"

            [logging]
            level = "warn"
            format = "json"
            "#
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.write_timeout_secs, 5);
        assert_eq!(config.server.read_timeout_secs, 10);
        assert_eq!(config.db.dsn, "postgres://greenlight@localhost/greenlight");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_loader_with_json_file_rejects_unknown_fields() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"server": {{"port": 5000, "idle_timeout": 60}}}}"#).unwrap();

        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::JsonError(_)));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/greenlight.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/greenlight.toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_loader_with_file_without_extension() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_overrides_apply_last_and_are_validated() {
        let toml = r#"
            [server]
            port = 5000
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .with_overrides(Overrides {
                port: Some(6000),
                env: Some("staging".into()),
                db_dsn: Some("postgres://localhost/test".into()),
            })
            .load()
            .unwrap();

        assert_eq!(config.server.port, 6000);
        assert_eq!(config.server.env, "staging");
        assert_eq!(config.db.dsn, "postgres://localhost/test");

        let err = ConfigLoader::new()
            .with_overrides(Overrides {
                env: Some("qa".into()),
                ..Overrides::default()
            })
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_apply_env_var_server() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SERVER__PORT", "9000", "TEST").unwrap();
        loader.apply_env_var("TEST__SERVER__ENV", "staging", "TEST").unwrap();
        loader
            .apply_env_var("TEST__SERVER__SHUTDOWN_TIMEOUT_SECS", "5", "TEST")
            .unwrap();

        assert_eq!(loader.config.server.port, 9000);
        assert_eq!(loader.config.server.env, "staging");
        assert_eq!(loader.config.server.shutdown_timeout_secs, 5);
    }

    #[test]
    fn test_apply_env_var_db_and_logging() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__DB__DSN", "postgres://db/movies", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__LEVEL", "debug", "TEST").unwrap();
        loader.apply_env_var("TEST__LOGGING__FORMAT", "JSON", "TEST").unwrap();

        assert_eq!(loader.config.db.dsn, "postgres://db/movies");
        assert_eq!(loader.config.logging.level, "debug");
        assert_eq!(loader.config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader.apply_env_var("TEST__SERVER__PORT", "70000", "TEST").is_err());
        assert!(loader
            .apply_env_var("TEST__SERVER__READ_TIMEOUT_SECS", "soon", "TEST")
            .is_err());
        assert!(loader.apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST").is_err());
    }

    #[test]
    fn test_apply_env_var_ignores_unknown_keys() {
        let mut loader = ConfigLoader::new();
        loader.apply_env_var("TEST__SMTP__HOST", "localhost", "TEST").unwrap();
        assert_eq!(loader.config, GreenlightConfig::default());
    }
}
