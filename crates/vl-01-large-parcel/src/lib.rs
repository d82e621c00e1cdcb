//! # VL-01 Large Parcel
//!
//! Passes arbitrarily large, strongly-typed messages across a parcel-based
//! IPC boundary. Small payloads ride inline in the call; payloads above the
//! threshold are written into an anonymous shared-memory region and only a
//! duplicated file descriptor crosses the boundary.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): no I/O beyond the memory primitive
//!   - `ParcelEncode` / `ParcelDecode`: codec capability (bincode)
//!   - `Envelope`: the self-describing wire unit (`Null`, `Inline`, `SharedMemory`)
//!   - `SharedMemory`: anonymous memfd-backed region with RAII mappings
//!   - `TransportConfig`: inline threshold
//!
//! - **Ports Layer** (`ports/`): `Parcel`, the primitive read/write surface
//!   of the host IPC mechanism
//!
//! - **Adapters Layer** (`adapters/`):
//!   - `InMemoryParcel`: byte buffer plus descriptor table
//!   - `socket`: frames an `InMemoryParcel` over a `UnixStream` with `SCM_RIGHTS`
//!
//! - **Service Layer** (`service/`):
//!   - `PayloadTransport`: serialize / deserialize with the threshold policy
//!   - `LargeParcelable<T>`: stateful instance that caches its placement decision
//!
//! ## Shared Memory Layout
//!
//! ```text
//! ┌────────────────────┬──────────────────────────────┐
//! │ u32 LE payload len │ payload bytes (len bytes)    │
//! └────────────────────┴──────────────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use vl_01_large_parcel::{PayloadTransport, Presence};
//!
//! let transport = PayloadTransport::default();
//! let envelope = transport.serialize_vector(&records)?;
//! assert_eq!(envelope.presence(), Presence::SharedMemory);
//!
//! let decoded: Option<Vec<Record>> = transport.deserialize_vector(&envelope)?;
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use adapters::InMemoryParcel;
pub use domain::{
    Envelope, ParcelDecode, ParcelEncode, Presence, SharedMemory, TransportConfig,
};
pub use error::ParcelError;
pub use ports::Parcel;
pub use service::{
    deserialize, deserialize_vector, serialize, serialize_vector, LargeParcelable,
    PayloadTransport,
};

/// Payloads whose serialized size exceeds this many bytes go through shared memory.
pub const MAX_DIRECT_PAYLOAD_SIZE: usize = 4096;

/// Size of the payload length header at the start of a shared-memory region.
pub const SHARED_MEMORY_HEADER_SIZE: usize = 4;
