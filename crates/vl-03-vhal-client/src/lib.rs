//! # VL-03 VHAL Client
//!
//! Asynchronous get/set client for a vehicle hardware abstraction layer.
//! Every request is resolved exactly once, through the same callback, with
//! a value, an error reported by the remote side, a transport error, or a
//! timeout.
//!
//! ## Architecture
//!
//! - **Ports Layer** (`ports/`):
//!   - Outbound: `VehicleHal` (remote service), `LinkUnlinkToDeath`
//!   - Inbound: `VehicleCallback` (responses), `DeathRecipient` (death notices)
//!
//! - **Service Layer** (`service/`):
//!   - `GetSetValueClient`: pending callbacks, batch serialization, response
//!     and timeout handling
//!   - `DeathNotifier`: registered endpoint-death callbacks
//!   - `VhalClient`: request ids, death link, property configs
//!
//! ## Request Lifecycle
//!
//! ```text
//! VhalClient::get_value
//!     │ next request id
//!     ▼
//! GetSetValueClient ──serialize──► Envelope ──► VehicleHal::get_values
//!     │ register with pool                          │
//!     │                                             ▼
//!     │                           VehicleCallback::on_get_values
//!     ▼                                             │
//! timeout sweep ──► Timeout (TRY_AGAIN)     try_finish ──► value / status error
//! ```
//!
//! Endpoint death does not fail in-flight requests; they resolve through
//! their own timeout.

pub mod config;
pub mod error;
pub mod ports;
pub mod service;

pub use config::ClientConfig;
pub use error::VhalError;
pub use ports::{DeathRecipient, LinkUnlinkToDeath, RemoteError, VehicleCallback, VehicleHal};
pub use service::{
    GetSetValueClient, GetValueCallback, OnBinderDiedCallback, ResultCallback, SetValueCallback,
    VhalClient,
};
