//! # Ports Layer
//!
//! - `parcel.rs` - Driven port: the primitive surface of the host IPC
//!   mechanism that envelopes are written to and read from

pub mod parcel;

pub use parcel::Parcel;
