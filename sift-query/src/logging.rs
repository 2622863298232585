//! Logging setup for filter construction and compilation.
//!
//! The crate emits `tracing` events on its own; this module only installs a
//! subscriber when asked to through the environment.
//!
//! # Environment Variables
//!
//! - `SIFT_DEBUG=true|1|yes` - Enable debug logging
//! - `SIFT_LOG_LEVEL=trace|debug|info|warn|error` - Set the log level
//! - `SIFT_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use sift_query::logging;
//!
//! logging::init();
//! ```
//!
//! Builders log each completed leaf at `debug`, combinators with a single
//! child and empty contains arrays at `warn`, and the compiler logs every
//! node it visits at `trace`.

use std::env;
use std::fmt;
use std::sync::Once;

static INIT: Once = Once::new();

const DEBUG_VAR: &str = "SIFT_DEBUG";
const LEVEL_VAR: &str = "SIFT_LOG_LEVEL";
const FORMAT_VAR: &str = "SIFT_LOG_FORMAT";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }

    /// Lowercase name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
            Self::Compact => "compact",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if `SIFT_DEBUG` is set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Log level from `SIFT_LOG_LEVEL`.
///
/// Unknown or missing values fall back to "debug" when `SIFT_DEBUG` is
/// enabled and "warn" otherwise.
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var(LEVEL_VAR) {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// Output format from `SIFT_LOG_FORMAT`.
pub fn get_log_format() -> LogFormat {
    env::var(FORMAT_VAR)
        .map(|f| LogFormat::parse(&f))
        .unwrap_or_default()
}

/// Install a global subscriber for this crate's events.
///
/// Does nothing unless `SIFT_DEBUG` or `SIFT_LOG_LEVEL` is set, or when the
/// `tracing-subscriber` feature is off. Only the first call has an effect.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var(LEVEL_VAR).is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let format = get_log_format();
            let filter = EnvFilter::try_new(format!("sift={},sift_query={}", level, level))
                .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(level, format = %format, "sift logging initialized");
            }
        }
    });
}

/// Set `SIFT_LOG_LEVEL` and call [`init`].
///
/// # Safety
///
/// Modifies the process environment. Call it at startup, before other
/// threads are spawned.
pub fn init_with_level(level: &str) {
    // SAFETY: documented as startup-only, before threads exist.
    unsafe {
        env::set_var(LEVEL_VAR, level);
    }
    init();
}

/// Set `SIFT_DEBUG=true` and call [`init`].
///
/// # Safety
///
/// Same constraints as [`init_with_level`].
pub fn init_debug() {
    // SAFETY: documented as startup-only, before threads exist.
    unsafe {
        env::set_var(DEBUG_VAR, "true");
    }
    init();
}

/// Debug event that is only emitted when `SIFT_DEBUG` is enabled.
#[macro_export]
macro_rules! sift_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::debug!($($arg)*);
        }
    };
}

/// Trace event that is only emitted when `SIFT_DEBUG` is enabled.
#[macro_export]
macro_rules! sift_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("compact"), LogFormat::Compact);
        assert_eq!(LogFormat::parse("xml"), LogFormat::Json);
        assert_eq!(LogFormat::default().to_string(), "json");
    }

    #[test]
    fn test_level_defaults_to_warn() {
        // SAFETY: the only test touching these variables.
        unsafe {
            env::remove_var(DEBUG_VAR);
            env::remove_var(LEVEL_VAR);
        }
        assert!(!is_debug_enabled());
        assert_eq!(get_log_level(), "warn");
    }
}
