//! The client applications hold.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use shared_types::{PropId, RequestId, StatusCode, VehiclePropConfig, VehiclePropValue};
use tokio::sync::oneshot;
use tracing::{debug, error, warn};
use vl_01_large_parcel::{Envelope, PayloadTransport};

use super::death::{DeathNotifier, OnBinderDiedCallback};
use super::get_set_value_client::{GetSetValueClient, GetValueCallback, SetValueCallback};
use crate::config::ClientConfig;
use crate::error::VhalError;
use crate::ports::{DeathRecipient, LinkUnlinkToDeath, VehicleHal};

/// VHAL client.
///
/// Assigns request ids from a per-instance counter, links to the remote's
/// death on construction and unlinks on drop. Dropping the client reports
/// every outstanding get/set as timed out.
pub struct VhalClient {
    get_set: Arc<GetSetValueClient>,
    hal: Arc<dyn VehicleHal>,
    death: Arc<DeathNotifier>,
    linker: Arc<dyn LinkUnlinkToDeath>,
    next_request_id: AtomicI64,
    transport: PayloadTransport,
}

impl VhalClient {
    /// Must be called inside a Tokio runtime.
    ///
    /// A failure to link to death is logged and otherwise ignored.
    pub fn new(
        hal: Arc<dyn VehicleHal>,
        linker: Arc<dyn LinkUnlinkToDeath>,
        config: ClientConfig,
    ) -> Result<Self, VhalError> {
        let get_set = Arc::new(GetSetValueClient::new(Arc::clone(&hal), &config)?);
        let death = Arc::new(DeathNotifier::new());

        let recipient: Arc<dyn DeathRecipient> = death.clone();
        if let Err(e) = linker.link_to_death(recipient) {
            error!(error = %e, "Failed to link to VHAL death");
        }

        debug!(timeout_ms = config.timeout.as_millis(), "VHAL client created");
        Ok(Self {
            get_set,
            hal,
            death,
            linker,
            next_request_id: AtomicI64::new(0),
            transport: PayloadTransport::new(config.transport),
        })
    }

    fn next_request_id(&self) -> RequestId {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn get_value(&self, value: &VehiclePropValue, callback: GetValueCallback) {
        let request_id = self.next_request_id();
        self.get_set.get_value(request_id, value, callback);
    }

    pub fn set_value(&self, value: &VehiclePropValue, callback: SetValueCallback) {
        let request_id = self.next_request_id();
        self.get_set.set_value(request_id, value, callback);
    }

    /// [`VhalClient::get_value`] as a future.
    pub async fn get_value_async(
        &self,
        value: &VehiclePropValue,
    ) -> Result<VehiclePropValue, VhalError> {
        let (tx, rx) = oneshot::channel();
        self.get_value(
            value,
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        );
        rx.await.unwrap_or_else(|_| Err(abandoned(value)))
    }

    /// [`VhalClient::set_value`] as a future.
    pub async fn set_value_async(&self, value: &VehiclePropValue) -> Result<(), VhalError> {
        let (tx, rx) = oneshot::channel();
        self.set_value(
            value,
            Box::new(move |outcome| {
                let _ = tx.send(outcome);
            }),
        );
        rx.await.unwrap_or_else(|_| Err(abandoned(value)))
    }

    pub fn count_pending_requests(&self) -> usize {
        self.get_set.count_pending_requests()
    }

    pub fn add_on_binder_died_callback(&self, callback: OnBinderDiedCallback) -> StatusCode {
        self.death.add(callback)
    }

    pub fn remove_on_binder_died_callback(&self, callback: &OnBinderDiedCallback) -> StatusCode {
        self.death.remove(callback)
    }

    pub fn count_on_binder_died_callbacks(&self) -> usize {
        self.death.count()
    }

    /// Death recipient registered with the linker.
    pub fn death_recipient(&self) -> Arc<dyn DeathRecipient> {
        self.death.clone()
    }

    pub fn get_all_prop_configs(&self) -> Result<Vec<VehiclePropConfig>, VhalError> {
        let envelope = self.hal.get_all_prop_configs().map_err(|e| {
            VhalError::from_remote("get all property configs".to_string(), e)
        })?;
        self.parse_prop_configs(&envelope)
    }

    pub fn get_prop_configs(&self, prop_ids: &[PropId]) -> Result<Vec<VehiclePropConfig>, VhalError> {
        let envelope = self.hal.get_prop_configs(prop_ids).map_err(|e| {
            VhalError::from_remote(format!("get prop configs for prop IDs: {prop_ids:?}"), e)
        })?;
        self.parse_prop_configs(&envelope)
    }

    fn parse_prop_configs(&self, envelope: &Envelope) -> Result<Vec<VehiclePropConfig>, VhalError> {
        let configs = self
            .transport
            .deserialize_vector::<VehiclePropConfig>(envelope)
            .map_err(|source| VhalError::Deserialization {
                what: "VehiclePropConfigs",
                source,
            })?;
        Ok(configs.unwrap_or_default())
    }
}

impl Drop for VhalClient {
    fn drop(&mut self) {
        if let Err(e) = self.linker.unlink_to_death(&self.death_recipient()) {
            warn!(error = %e, "Failed to unlink from VHAL death");
        }
    }
}

fn abandoned(value: &VehiclePropValue) -> VhalError {
    VhalError::Abandoned {
        prop_id: value.prop_id(),
        area_id: value.area_id(),
    }
}
