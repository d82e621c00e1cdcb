//! # Outbound Ports (Driven Ports)
//!
//! Interfaces the host application implements on top of its IPC mechanism.

use std::sync::Arc;

use shared_types::PropId;
use thiserror::Error;
use vl_01_large_parcel::Envelope;

use super::inbound::{DeathRecipient, VehicleCallback};

/// Failure of a remote call, as reported by the IPC layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The remote process is gone.
    #[error("dead object")]
    DeadObject,

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("service specific error {code}: {message}")]
    ServiceSpecific { code: i32, message: String },
}

/// Remote vehicle HAL service.
///
/// Request and response batches travel as envelopes of
/// `Vec<GetValueRequest>`, `Vec<SetValueRequest>` and
/// `Vec<VehiclePropConfig>`.
pub trait VehicleHal: Send + Sync {
    /// Send a batch of get requests. Results arrive later through
    /// `callback.on_get_values`.
    fn get_values(
        &self,
        callback: Arc<dyn VehicleCallback>,
        requests: &Envelope,
    ) -> Result<(), RemoteError>;

    /// Send a batch of set requests. Results arrive later through
    /// `callback.on_set_values`.
    fn set_values(
        &self,
        callback: Arc<dyn VehicleCallback>,
        requests: &Envelope,
    ) -> Result<(), RemoteError>;

    fn get_all_prop_configs(&self) -> Result<Envelope, RemoteError>;

    fn get_prop_configs(&self, prop_ids: &[PropId]) -> Result<Envelope, RemoteError>;
}

/// Death notification registration for the remote endpoint.
pub trait LinkUnlinkToDeath: Send + Sync {
    fn link_to_death(&self, recipient: Arc<dyn DeathRecipient>) -> Result<(), RemoteError>;

    fn unlink_to_death(&self, recipient: &Arc<dyn DeathRecipient>) -> Result<(), RemoteError>;
}
