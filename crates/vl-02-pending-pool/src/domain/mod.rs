//! Domain types for the pending-request pool

pub mod config;
pub mod stats;

pub use config::PoolConfig;
pub use stats::{PoolCounters, PoolStats};

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use shared_types::RequestId;

/// Key grouping requests that share one timeout callback.
///
/// Requests registered without a client id form their own group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Invoked with the ids of a group that expired in one sweep.
pub type TimeoutCallback = Arc<dyn Fn(&HashSet<RequestId>) + Send + Sync>;
