//! # Service Layer
//!
//! - `transport.rs`: `PayloadTransport`, the threshold policy between inline
//!   and shared-memory envelopes
//! - `large_parcelable.rs`: `LargeParcelable<T>`, a message bound to its
//!   one-time placement decision

pub mod large_parcelable;
pub mod transport;

pub use large_parcelable::LargeParcelable;
pub use transport::{deserialize, deserialize_vector, serialize, serialize_vector, PayloadTransport};
