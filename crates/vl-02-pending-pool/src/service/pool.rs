//! Pending request pool.
//!
//! Flow:
//! 1. Caller registers a batch with `add_requests()` before sending it
//! 2. Response handler calls `try_finish_requests()` and only acts on the
//!    ids it gets back
//! 3. The sweep task expires whatever is left past its deadline and reports
//!    it through the group's timeout callback

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use shared_types::RequestId;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::domain::{ClientId, PoolConfig, PoolCounters, PoolStats, TimeoutCallback};
use crate::error::PoolError;

/// Requests sharing one timeout callback.
struct ClientGroup {
    callback: TimeoutCallback,
    deadlines: HashMap<RequestId, Instant>,
}

/// Ids taken out of the pool together with the callback that must hear about them.
type Expired = Vec<(Option<ClientId>, TimeoutCallback, HashSet<RequestId>)>;

struct PoolInner {
    config: PoolConfig,
    groups: Mutex<HashMap<Option<ClientId>, ClientGroup>>,
    counters: PoolCounters,
}

impl PoolInner {
    fn check_timeouts(&self) -> usize {
        let now = Instant::now();
        let expired: Expired = {
            let mut groups = self.groups.lock();
            let mut expired = Vec::new();
            groups.retain(|client, group| {
                let ids: HashSet<RequestId> = group
                    .deadlines
                    .iter()
                    .filter(|(_, deadline)| now >= **deadline)
                    .map(|(id, _)| *id)
                    .collect();
                if !ids.is_empty() {
                    for id in &ids {
                        group.deadlines.remove(id);
                    }
                    expired.push((*client, Arc::clone(&group.callback), ids));
                }
                !group.deadlines.is_empty()
            });
            expired
        };
        self.report(expired, "Pending requests timed out")
    }

    fn drain(&self) -> usize {
        let groups = std::mem::take(&mut *self.groups.lock());
        let expired: Expired = groups
            .into_iter()
            .filter(|(_, group)| !group.deadlines.is_empty())
            .map(|(client, group)| (client, group.callback, group.deadlines.into_keys().collect()))
            .collect();
        self.report(expired, "Pool shut down with pending requests")
    }

    /// Runs the callbacks. Must be called without the lock held.
    fn report(&self, expired: Expired, message: &str) -> usize {
        let mut total = 0;
        for (client, callback, ids) in expired {
            total += ids.len();
            self.counters.record_timed_out(ids.len());
            warn!(client = ?client, count = ids.len(), "{message}");
            callback(&ids);
        }
        total
    }

    fn pending(&self) -> usize {
        self.groups
            .lock()
            .values()
            .map(|group| group.deadlines.len())
            .sum()
    }
}

/// Exactly-once arbiter between responses and timeouts.
///
/// Dropping the pool stops the sweep and reports every request still pending
/// as timed out before `drop` returns.
pub struct PendingRequestPool {
    inner: Arc<PoolInner>,
    sweeper: JoinHandle<()>,
}

impl PendingRequestPool {
    /// Create a pool and start its sweep task on the current Tokio runtime.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_| PoolError::NoRuntime)?;

        let inner = Arc::new(PoolInner {
            config,
            groups: Mutex::new(HashMap::new()),
            counters: PoolCounters::default(),
        });
        let sweeper = handle.spawn(sweep_task(
            Arc::downgrade(&inner),
            config.effective_sweep_interval(),
        ));

        debug!(
            timeout_ms = config.timeout.as_millis(),
            sweep_ms = config.sweep_interval.as_millis(),
            "Pending request pool started"
        );
        Ok(Self { inner, sweeper })
    }

    /// Shorthand for `new(PoolConfig::new(timeout))`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, PoolError> {
        Self::new(PoolConfig::new(timeout))
    }

    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Register a batch of request ids under `client`.
    ///
    /// Every id gets the deadline `now + timeout`. `callback` becomes the
    /// group's timeout callback, replacing any earlier one. If any id is
    /// already pending in the group (or repeated in the batch) nothing is
    /// registered.
    pub fn add_requests(
        &self,
        client: Option<ClientId>,
        request_ids: impl IntoIterator<Item = RequestId>,
        callback: TimeoutCallback,
    ) -> Result<(), PoolError> {
        let ids: Vec<RequestId> = request_ids.into_iter().collect();
        let deadline = Instant::now() + self.inner.config.timeout;

        let mut groups = self.inner.groups.lock();
        let mut seen = HashSet::with_capacity(ids.len());
        let existing = groups.get(&client);
        for id in &ids {
            let pending = existing.is_some_and(|group| group.deadlines.contains_key(id));
            if pending || !seen.insert(*id) {
                return Err(PoolError::DuplicateRequest {
                    client,
                    request_id: *id,
                });
            }
        }

        let group = groups.entry(client).or_insert_with(|| ClientGroup {
            callback: Arc::clone(&callback),
            deadlines: HashMap::new(),
        });
        group.callback = callback;
        group.deadlines.extend(ids.iter().map(|id| (*id, deadline)));
        drop(groups);

        self.inner.counters.record_registered(ids.len());
        debug!(client = ?client, count = ids.len(), "Registered pending requests");
        Ok(())
    }

    /// Remove and return the ids from `request_ids` that were still pending.
    ///
    /// The caller owns the returned ids: nothing else will ever report them.
    pub fn try_finish_requests(
        &self,
        client: Option<ClientId>,
        request_ids: &[RequestId],
    ) -> HashSet<RequestId> {
        let mut finished = HashSet::new();
        {
            let mut groups = self.inner.groups.lock();
            if let Some(group) = groups.get_mut(&client) {
                for id in request_ids {
                    if group.deadlines.remove(id).is_some() {
                        finished.insert(*id);
                    }
                }
                if group.deadlines.is_empty() {
                    groups.remove(&client);
                }
            }
        }
        self.inner.counters.record_finished(finished.len());
        finished
    }

    /// Expire everything past its deadline now. Returns the number expired.
    ///
    /// This is what the sweep task runs on each tick.
    pub fn check_timeouts(&self) -> usize {
        self.inner.check_timeouts()
    }

    pub fn count_pending_requests(&self, client: Option<ClientId>) -> usize {
        self.inner
            .groups
            .lock()
            .get(&client)
            .map_or(0, |group| group.deadlines.len())
    }

    pub fn total_pending_requests(&self) -> usize {
        self.inner.pending()
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.counters.snapshot(self.inner.pending())
    }
}

impl fmt::Debug for PendingRequestPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRequestPool")
            .field("config", &self.inner.config)
            .field("pending", &self.inner.pending())
            .finish_non_exhaustive()
    }
}

impl Drop for PendingRequestPool {
    fn drop(&mut self) {
        self.sweeper.abort();
        let drained = self.inner.drain();
        if drained > 0 {
            debug!(drained, "Pending request pool dropped");
        }
    }
}

async fn sweep_task(pool: Weak<PoolInner>, period: Duration) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        let Some(pool) = pool.upgrade() else {
            break;
        };
        pool.check_timeouts();
    }
}
