//! # Adapters Module
//!
//! ## Modules
//!
//! - `memory_parcel`: `Parcel` over a byte buffer plus a descriptor table
//! - `socket`: carries an `InMemoryParcel` across a Unix domain socket

pub mod memory_parcel;
pub mod socket;

pub use memory_parcel::InMemoryParcel;
pub use socket::{recv_parcel, send_parcel};
