//! # Service Layer

pub mod pool;

pub use pool::PendingRequestPool;
