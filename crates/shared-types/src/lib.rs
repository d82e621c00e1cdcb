//! # Shared Types Crate
//!
//! Vehicle property schema types exchanged between the VHAL client and the
//! vehicle HAL service.
//!
//! ## Design Principles
//!
//! - **Opaque to the transport**: every type here derives `Serialize` and
//!   `Deserialize`, which is all the large-payload transport needs to carry
//!   it either inline or through shared memory.
//! - **Request correlation by id**: batched requests and results carry the
//!   caller-assigned `request_id`; nothing else links a result to its request.
//! - **Status codes are values**: a non-OK `StatusCode` in a result is data,
//!   not a transport failure.

pub mod config;
pub mod property;
pub mod status;

pub use config::*;
pub use property::*;
pub use status::*;
