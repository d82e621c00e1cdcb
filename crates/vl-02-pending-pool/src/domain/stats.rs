//! Pool statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, updated without taking the pool lock.
#[derive(Debug, Default)]
pub struct PoolCounters {
    pub registered: AtomicU64,
    pub finished: AtomicU64,
    pub timed_out: AtomicU64,
}

impl PoolCounters {
    pub(crate) fn record_registered(&self, n: usize) {
        self.registered.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_finished(&self, n: usize) {
        self.finished.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_timed_out(&self, n: usize) {
        self.timed_out.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self, pending: usize) -> PoolStats {
        PoolStats {
            registered: self.registered.load(Ordering::Relaxed),
            finished: self.finished.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            pending,
        }
    }
}

/// Point-in-time view of the counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub registered: u64,
    pub finished: u64,
    pub timed_out: u64,
    pub pending: usize,
}

impl PoolStats {
    /// Every registered request is pending, finished or timed out.
    pub fn is_balanced(&self) -> bool {
        self.registered == self.finished + self.timed_out + self.pending as u64
    }
}
