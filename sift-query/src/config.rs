//! Configuration file parsing for `sift.toml`.
//!
//! ```toml
//! [encoding]
//! timestamp_precision = "millis"
//!
//! [debug]
//! log_filters = false
//!
//! [environments.development.debug]
//! log_filters = true
//! ```

#![allow(unused_assignments)]

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::Filters;
use crate::compiler::Compiler;
use crate::value::{TimestampPrecision, ValueEncoder};

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading a configuration.
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    /// Error reading the configuration file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(sift::config::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(sift::config::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// A value that parsed but cannot be used.
    #[error("invalid configuration value: {message}")]
    #[diagnostic(code(sift::config::invalid_value))]
    InvalidValue { message: String },
}

/// Main configuration structure for `sift.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SiftConfig {
    /// Value encoding settings.
    #[serde(default)]
    pub encoding: EncodingConfig,

    /// Debug/logging settings.
    #[serde(default)]
    pub debug: DebugConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl SiftConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        let config = content.parse()?;
        crate::sift_debug!(path = %path.display(), "loaded sift configuration");
        Ok(config)
    }

    /// Apply the overrides of environment `env`.
    ///
    /// Fails with [`ConfigError::InvalidValue`] when `env` is not defined
    /// under `[environments]`.
    pub fn with_environment(mut self, env: &str) -> ConfigResult<Self> {
        let overrides = self
            .environments
            .remove(env)
            .ok_or_else(|| ConfigError::InvalidValue {
                message: format!("unknown environment `{}`", env),
            })?;

        if let Some(precision) = overrides.encoding.and_then(|e| e.timestamp_precision) {
            self.encoding.timestamp_precision = precision;
        }
        if let Some(log_filters) = overrides.debug.and_then(|d| d.log_filters) {
            self.debug.log_filters = log_filters;
        }
        crate::sift_debug!(environment = env, "applied environment overrides");
        Ok(self)
    }

    /// Encoder using the configured timestamp precision.
    pub fn encoder(&self) -> ValueEncoder {
        ValueEncoder::new(self.encoding.timestamp_precision)
    }

    /// Compiler using the configured debug settings.
    pub fn compiler(&self) -> Compiler {
        Compiler::new().with_filter_logging(self.debug.log_filters)
    }

    /// Builder entry points using the configured encoder.
    pub fn filters(&self) -> Filters {
        Filters::new(self.encoder())
    }
}

impl FromStr for SiftConfig {
    type Err = ConfigError;

    /// Parse configuration from TOML, expanding `${VAR}` references first.
    fn from_str(content: &str) -> ConfigResult<Self> {
        let expanded = expand_env_vars(content)?;
        toml::from_str(&expanded).map_err(|e| ConfigError::TomlError { source: e })
    }
}

/// Value encoding configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EncodingConfig {
    /// Fractional-second precision of encoded dates.
    #[serde(default)]
    pub timestamp_precision: TimestampPrecision,
}

/// Debug/logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Log every compiled wire message as JSON.
    #[serde(default)]
    pub log_filters: bool,
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Encoding overrides.
    pub encoding: Option<EncodingOverride>,

    /// Debug overrides.
    pub debug: Option<DebugOverride>,
}

/// Encoding configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EncodingOverride {
    /// Override timestamp_precision.
    pub timestamp_precision: Option<TimestampPrecision>,
}

/// Debug configuration overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DebugOverride {
    /// Override log_filters.
    pub log_filters: Option<bool>,
}

/// Expand environment variables in the format `${VAR_NAME}`.
///
/// Unset variables are left as written.
fn expand_env_vars(content: &str) -> ConfigResult<String> {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::InvalidValue {
        message: e.to_string(),
    })?;

    let expanded = re.replace_all(content, |cap: &regex_lite::Captures<'_>| {
        std::env::var(&cap[1]).unwrap_or_else(|_| cap[0].to_string())
    });
    Ok(expanded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiftConfig::default();
        assert_eq!(config.encoding.timestamp_precision, TimestampPrecision::Auto);
        assert!(!config.debug.log_filters);
        assert!(!config.compiler().logs_filters());
    }

    #[test]
    fn test_parse_config() {
        let config: SiftConfig = r#"
            [encoding]
            timestamp_precision = "micros"

            [debug]
            log_filters = true
        "#
        .parse()
        .unwrap();

        assert_eq!(config.encoder().precision(), TimestampPrecision::Micros);
        assert!(config.compiler().logs_filters());
        assert_eq!(config.filters().encoder(), config.encoder());
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let err = "[encoding]\nprecision = \"millis\"\n"
            .parse::<SiftConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::TomlError { .. }));
    }

    #[test]
    fn test_environment_override() {
        let config: SiftConfig = r#"
            [environments.production.encoding]
            timestamp_precision = "seconds"

            [environments.development.debug]
            log_filters = true
        "#
        .parse()
        .unwrap();

        let production = config.clone().with_environment("production").unwrap();
        assert_eq!(production.encoding.timestamp_precision, TimestampPrecision::Seconds);
        assert!(!production.debug.log_filters);

        let development = config.clone().with_environment("development").unwrap();
        assert!(development.debug.log_filters);

        let err = config.with_environment("staging").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(
            err.to_string(),
            "invalid configuration value: unknown environment `staging`"
        );
    }

    #[test]
    fn test_env_var_expansion() {
        // SAFETY: no other test reads this variable.
        unsafe {
            std::env::set_var("SIFT_TEST_PRECISION", "nanos");
        }
        let expanded = expand_env_vars("timestamp_precision = \"${SIFT_TEST_PRECISION}\"").unwrap();
        assert_eq!(expanded, "timestamp_precision = \"nanos\"");

        let untouched = expand_env_vars("x = \"${SIFT_TEST_UNSET_VARIABLE}\"").unwrap();
        assert_eq!(untouched, "x = \"${SIFT_TEST_UNSET_VARIABLE}\"");
        unsafe {
            std::env::remove_var("SIFT_TEST_PRECISION");
        }
    }

    #[test]
    fn test_missing_file() {
        let err = SiftConfig::from_file("/nonexistent/sift.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
