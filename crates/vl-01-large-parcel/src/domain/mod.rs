//! Domain layer for the large-payload transport

pub mod codec;
pub mod config;
pub mod envelope;
pub mod shared_memory;

pub use codec::{decode_each, ParcelDecode, ParcelEncode};
pub use config::TransportConfig;
pub use envelope::{Envelope, Presence};
pub use shared_memory::{ReadOnlyMapping, ReadWriteMapping, SharedMemory};
