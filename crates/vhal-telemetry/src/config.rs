//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for the logging subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or directives)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to include thread ids in each event
    pub thread_ids: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "vhal-client".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            thread_ids: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VHAL_SERVICE_NAME`: Service name (default: vhal-client)
    /// - `VHAL_LOG_LEVEL`: Log level; takes precedence over `RUST_LOG`
    /// - `RUST_LOG`: Log level when `VHAL_LOG_LEVEL` is unset (default: info)
    /// - `VHAL_JSON_LOGS`: Enable JSON logs (default: false)
    /// - `VHAL_LOG_THREAD_IDS`: Include thread ids (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("VHAL_SERVICE_NAME")
                .unwrap_or_else(|_| "vhal-client".to_string()),

            log_level: env::var("VHAL_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("VHAL_JSON_LOGS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),

            thread_ids: env::var("VHAL_LOG_THREAD_IDS")
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    /// Builder-style method to set the log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
