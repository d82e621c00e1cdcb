//! # Inbound Ports (Driving Ports)

use vl_01_large_parcel::Envelope;

use crate::error::VhalError;

/// Response channel handed to the remote with every request batch.
pub trait VehicleCallback: Send + Sync {
    /// A batch of `GetValueResult`s.
    fn on_get_values(&self, results: Envelope) -> Result<(), VhalError>;

    /// A batch of `SetValueResult`s.
    fn on_set_values(&self, results: Envelope) -> Result<(), VhalError>;
}

/// Receives endpoint-death notifications.
pub trait DeathRecipient: Send + Sync {
    /// The remote endpoint died.
    fn on_binder_died(&self);

    /// The link was removed; no further notifications will arrive.
    fn on_binder_unlinked(&self);
}
