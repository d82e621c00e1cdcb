//! # Ports Layer
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (the remote side calls into the client)
//! - `outbound.rs` - Driven ports (what the client needs from the host)

pub mod inbound;
pub mod outbound;

pub use inbound::{DeathRecipient, VehicleCallback};
pub use outbound::{LinkUnlinkToDeath, RemoteError, VehicleHal};
