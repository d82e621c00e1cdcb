//! # VL-02 Pending Request Pool
//!
//! Tracks requests that were sent to a remote endpoint and are waiting for a
//! response, and guarantees that each one is resolved exactly once: either
//! the response handler claims it through [`PendingRequestPool::try_finish_requests`]
//! or the background sweep reports it as timed out. Never both, never neither.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`):
//!   - `ClientId`: grouping key for requests that share a timeout callback
//!   - `PoolConfig`: timeout and sweep interval
//!   - `PoolStats`: registration / completion / timeout counters
//!
//! - **Service Layer** (`service/`):
//!   - `PendingRequestPool`: the arbiter, plus its sweep task
//!
//! ## Resolution Paths
//!
//! ```text
//!                    add_requests
//!                         │
//!                         ▼
//!                    ┌─────────┐
//!                    │ pending │
//!                    └────┬────┘
//!         ┌───────────────┼──────────────────┐
//!         ▼               ▼                  ▼
//!  try_finish_requests  sweep (deadline)   pool dropped
//!   (response won)      timeout callback   timeout callback
//! ```
//!
//! All three paths remove the entry under the same lock, so whichever gets
//! there first owns the request.

pub mod domain;
pub mod error;
pub mod service;

pub use domain::{ClientId, PoolConfig, PoolStats, TimeoutCallback};
pub use error::PoolError;
pub use service::PendingRequestPool;

/// Upper bound on the sweep interval.
pub const MAX_SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);
