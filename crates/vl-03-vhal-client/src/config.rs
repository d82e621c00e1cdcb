//! Client configuration from environment variables.

use std::env;
use std::time::Duration;

use vl_01_large_parcel::TransportConfig;
use vl_02_pending_pool::PoolConfig;

/// Default time a get/set request may stay unanswered.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientConfig {
    /// Per-request timeout
    pub timeout: Duration,

    /// Overrides the pool's `min(timeout, 1s)` sweep interval
    pub sweep_interval: Option<Duration>,

    /// Inline threshold for outgoing request batches
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            sweep_interval: None,
            transport: TransportConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `VHAL_CLIENT_TIMEOUT_MS`: Request timeout (default: 10000)
    /// - `VHAL_CLIENT_SWEEP_INTERVAL_MS`: Timeout sweep interval (default: min(timeout, 1000))
    /// - `VHAL_MAX_DIRECT_PAYLOAD_SIZE`: Inline threshold in bytes (default: 4096)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            timeout: env::var("VHAL_CLIENT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),

            sweep_interval: env::var("VHAL_CLIENT_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis),

            transport: env::var("VHAL_MAX_DIRECT_PAYLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(|bytes| TransportConfig::default().with_max_direct_payload_size(bytes))
                .unwrap_or(defaults.transport),
        }
    }

    /// Builder-style method to set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool_config(&self) -> PoolConfig {
        let config = PoolConfig::new(self.timeout);
        match self.sweep_interval {
            Some(interval) => config.with_sweep_interval(interval),
            None => config,
        }
    }
}
