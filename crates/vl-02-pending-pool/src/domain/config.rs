//! Pool configuration

use std::time::Duration;

use crate::MAX_SWEEP_INTERVAL;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Time a request may stay pending before it is reported as timed out.
    pub timeout: Duration,
    /// How often the sweep looks for expired requests.
    pub sweep_interval: Duration,
}

impl PoolConfig {
    /// Sweep interval defaults to `min(timeout, 1s)`.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            sweep_interval: timeout.min(MAX_SWEEP_INTERVAL),
        }
    }

    /// Builder-style method to override the sweep interval
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Interval actually handed to the timer; a zero period is not allowed.
    pub(crate) fn effective_sweep_interval(&self) -> Duration {
        self.sweep_interval.max(Duration::from_millis(1))
    }
}
