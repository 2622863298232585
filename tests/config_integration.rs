//! Integration tests for configuration loading and its effect on filters.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use sift::query::TimestampPrecision;
use sift::{ConfigError, SiftConfig};

/// An empty file yields the defaults
#[test]
fn test_config_empty() {
    let config: SiftConfig = "".parse().expect("Failed to parse config");
    assert_eq!(config, SiftConfig::default());
}

/// Configured precision flows into every builder created from the config
#[test]
fn test_config_precision_applies_to_filters() {
    let config: SiftConfig = r#"
        [encoding]
        timestamp_precision = "millis"
    "#
    .parse()
    .expect("Failed to parse config");

    let since = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let filter = config
        .filters()
        .creation_time()
        .greater_than(since)
        .unwrap();
    let wire = config.compiler().compile(&filter);

    assert_eq!(wire.value_text.as_deref(), Some("2024-06-01T08:00:00.000Z"));
}

/// Environment overrides replace only the fields they name
#[test]
fn test_config_environment_overrides() {
    let config: SiftConfig = r#"
        [encoding]
        timestamp_precision = "micros"

        [debug]
        log_filters = false

        [environments.development.debug]
        log_filters = true
    "#
    .parse()
    .expect("Failed to parse config");

    let dev = config
        .clone()
        .with_environment("development")
        .expect("environment is defined");
    assert_eq!(dev.encoding.timestamp_precision, TimestampPrecision::Micros);
    assert!(dev.debug.log_filters);
    assert!(dev.compiler().logs_filters());

    let err = config.with_environment("production").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

/// Invalid values surface as TOML errors
#[test]
fn test_config_invalid_precision() {
    let err = r#"
        [encoding]
        timestamp_precision = "minutes"
    "#
    .parse::<SiftConfig>()
    .unwrap_err();

    assert!(matches!(err, ConfigError::TomlError { .. }));
}

/// Configuration round-trips through a file on disk
#[test]
fn test_config_from_file() {
    let path = std::env::temp_dir().join(format!("sift-config-{}.toml", std::process::id()));
    std::fs::write(&path, "[encoding]\ntimestamp_precision = \"seconds\"\n").unwrap();

    let config = SiftConfig::from_file(&path).expect("Failed to load config");
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.encoder().precision(), TimestampPrecision::Seconds);
}
