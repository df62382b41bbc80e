//! Logging infrastructure for Tabula.
//!
//! This module provides structured logging controlled by the `TABULA_DEBUG` environment variable.
//!
//! # Environment Variables
//!
//! - `TABULA_DEBUG=true` - Enable debug logging (also turns on per-fragment logging)
//! - `TABULA_DEBUG=1` - Enable debug logging
//! - `TABULA_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `TABULA_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! # Usage
//!
//! ```rust,no_run
//! use tabula_query::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```
//!
//! # Internal Logging
//!
//! Within Tabula, use the standard tracing macros:
//!
//! ```rust,ignore
//! use tracing::{debug, warn};
//!
//! debug!(field = %key, fragment = ?filter, "compiled filter fragment");
//! warn!(param = %name, value = %raw, "dropping malformed filter parameter");
//! ```

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `TABULA_DEBUG` environment variable.
///
/// Returns `true` if `TABULA_DEBUG` is set to "true", "1", or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("TABULA_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Get the configured log level from `TABULA_LOG_LEVEL` environment variable.
///
/// Defaults to "debug" if `TABULA_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("TABULA_LOG_LEVEL") {
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

/// Get the configured log format from `TABULA_LOG_FORMAT` environment variable.
///
/// Defaults to "json" for structured logging.
pub fn get_log_format() -> &'static str {
    env::var("TABULA_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the Tabula logging system.
///
/// This should be called once at application startup. Subsequent calls are no-ops.
/// Without the `tracing-subscriber` feature the library only emits events; installing a
/// subscriber is left to the host application.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("TABULA_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "tabula={},tabula_query={},tabula_schema={}",
                level, level, level
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            // try_init: the host may already have installed a global subscriber.
            let installed = match get_log_format() {
                "json" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json())
                    .try_init(),
                "compact" => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact())
                    .try_init(),
                _ => tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty())
                    .try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "Tabula logging initialized"
                );
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_disabled_by_default() {
        // SAFETY: Test runs in isolation
        unsafe {
            env::remove_var("TABULA_DEBUG");
        }
        assert!(!is_debug_enabled());
    }

    #[test]
    fn test_log_level_default() {
        // SAFETY: Test runs in isolation
        unsafe {
            env::remove_var("TABULA_DEBUG");
            env::remove_var("TABULA_LOG_LEVEL");
        }
        assert_eq!(get_log_level(), "warn");
    }
}
