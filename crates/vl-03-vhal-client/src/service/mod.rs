//! # Service Layer
//!
//! - `get_set_value_client.rs`: pending callbacks and response/timeout handling
//! - `death.rs`: endpoint-death callback registry
//! - `vhal_client.rs`: the client applications hold

pub mod death;
pub mod get_set_value_client;
pub mod vhal_client;

pub use death::{DeathNotifier, OnBinderDiedCallback};
pub use get_set_value_client::{
    GetSetValueClient, GetValueCallback, ResultCallback, SetValueCallback,
};
pub use vhal_client::VhalClient;
