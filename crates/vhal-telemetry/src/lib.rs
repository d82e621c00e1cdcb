//! # VHAL Telemetry
//!
//! Installs the process-wide `tracing` subscriber used by the transport,
//! pool and client crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vhal_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     init_logging(&TelemetryConfig::from_env()).expect("Failed to init logging");
//!     // Spans and events from every crate are now emitted
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `VHAL_LOG_LEVEL`, else `RUST_LOG` | `info` | Log level filter |
//! | `VHAL_JSON_LOGS` | `false` | JSON formatted output |
//! | `VHAL_LOG_THREAD_IDS` | `false` | Include thread ids |
//! | `VHAL_SERVICE_NAME` | `vhal-client` | Service name in the startup event |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}
