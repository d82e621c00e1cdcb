//! # Fakes
//!
//! A property store standing in for the vehicle HAL, and a death link that
//! can be killed on demand. Every envelope crossing the fake boundary is
//! written into an [`InMemoryParcel`] and read back, so descriptors are
//! duplicated exactly as they would be by a real IPC hop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use parking_lot::Mutex;
use shared_types::{
    AreaId, GetValueRequest, GetValueResult, PropId, SetValueRequest, SetValueResult, StatusCode,
    VehiclePropConfig, VehiclePropValue,
};
use vhal_telemetry::TelemetryConfig;
use vl_01_large_parcel::{
    Envelope, InMemoryParcel, Parcel, ParcelError, PayloadTransport, Presence, TransportConfig,
};
use vl_03_vhal_client::{DeathRecipient, LinkUnlinkToDeath, RemoteError, VehicleCallback, VehicleHal};

static LOGGING: Once = Once::new();

/// Route test logs through the same subscriber the services use.
///
/// Honors `VHAL_LOG_LEVEL`/`RUST_LOG`; a second global subscriber is ignored.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let config = TelemetryConfig::from_env();
        let _ = vhal_telemetry::init_logging(&config);
    });
}

/// Carry an envelope across a simulated process boundary.
pub fn ferry(envelope: &Envelope) -> Result<Envelope, ParcelError> {
    let mut parcel = InMemoryParcel::new();
    envelope.write_to_parcel(&mut parcel)?;
    parcel.set_data_position(0)?;
    Envelope::read_from_parcel(&mut parcel)
}

fn transaction(e: ParcelError) -> RemoteError {
    RemoteError::Transaction(e.to_string())
}

/// How the fake answers get/set batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    /// Store sets, answer gets from the store (or echo the request).
    Store,
    /// Answer every request with this status.
    Status(StatusCode),
    /// Answer gets with OK but no value.
    Empty,
    /// Build the normal answer but hold it until [`FakeVehicleHal::release_held`].
    Hold,
    /// Accept the batch and never answer.
    Silent,
}

enum HeldKind {
    Get,
    Set,
}

struct HeldReply {
    callback: Arc<dyn VehicleCallback>,
    kind: HeldKind,
    results: Envelope,
}

/// In-process vehicle HAL.
pub struct FakeVehicleHal {
    reply: Mutex<Reply>,
    dead: AtomicBool,
    transport: PayloadTransport,
    values: Mutex<HashMap<(PropId, AreaId), VehiclePropValue>>,
    configs: Vec<VehiclePropConfig>,
    held: Mutex<Vec<HeldReply>>,
    request_placements: Mutex<Vec<Presence>>,
    callback_errors: AtomicUsize,
}

impl FakeVehicleHal {
    pub fn new(reply: Reply) -> Self {
        Self::with_configs(reply, Vec::new())
    }

    pub fn with_configs(reply: Reply, configs: Vec<VehiclePropConfig>) -> Self {
        Self {
            reply: Mutex::new(reply),
            dead: AtomicBool::new(false),
            transport: PayloadTransport::new(TransportConfig::default()),
            values: Mutex::new(HashMap::new()),
            configs,
            held: Mutex::new(Vec::new()),
            request_placements: Mutex::new(Vec::new()),
            callback_errors: AtomicUsize::new(0),
        }
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock() = reply;
    }

    pub fn kill(&self) {
        self.dead.store(true, Ordering::SeqCst);
    }

    pub fn is_dead(&self) -> bool {
        self.dead.load(Ordering::SeqCst)
    }

    /// Placement of every request envelope received so far.
    pub fn request_placements(&self) -> Vec<Presence> {
        self.request_placements.lock().clone()
    }

    pub fn stored(&self, prop: PropId, area: AreaId) -> Option<VehiclePropValue> {
        self.values.lock().get(&(prop, area)).cloned()
    }

    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }

    /// Times the client rejected a results envelope.
    pub fn callback_errors(&self) -> usize {
        self.callback_errors.load(Ordering::SeqCst)
    }

    /// Deliver every held reply. Returns how many batches were delivered.
    pub fn release_held(&self) -> usize {
        let held = std::mem::take(&mut *self.held.lock());
        let delivered = held.len();
        for reply in held {
            let outcome = match reply.kind {
                HeldKind::Get => reply.callback.on_get_values(reply.results),
                HeldKind::Set => reply.callback.on_set_values(reply.results),
            };
            if outcome.is_err() {
                self.callback_errors.fetch_add(1, Ordering::SeqCst);
            }
        }
        delivered
    }

    fn check_alive(&self) -> Result<(), RemoteError> {
        if self.is_dead() {
            return Err(RemoteError::DeadObject);
        }
        Ok(())
    }

    fn receive<T: serde::de::DeserializeOwned>(
        &self,
        requests: &Envelope,
    ) -> Result<Vec<T>, RemoteError> {
        let requests = ferry(requests).map_err(transaction)?;
        self.request_placements.lock().push(requests.presence());
        let decoded = self
            .transport
            .deserialize_vector::<T>(&requests)
            .map_err(transaction)?;
        Ok(decoded.unwrap_or_default())
    }

    fn answer(
        &self,
        callback: Arc<dyn VehicleCallback>,
        kind: HeldKind,
        results: Envelope,
        reply: Reply,
    ) -> Result<(), RemoteError> {
        let results = ferry(&results).map_err(transaction)?;
        match reply {
            Reply::Silent => Ok(()),
            Reply::Hold => {
                self.held.lock().push(HeldReply {
                    callback,
                    kind,
                    results,
                });
                Ok(())
            }
            _ => {
                let outcome = match kind {
                    HeldKind::Get => callback.on_get_values(results),
                    HeldKind::Set => callback.on_set_values(results),
                };
                if outcome.is_err() {
                    self.callback_errors.fetch_add(1, Ordering::SeqCst);
                }
                Ok(())
            }
        }
    }
}

impl VehicleHal for FakeVehicleHal {
    fn get_values(
        &self,
        callback: Arc<dyn VehicleCallback>,
        requests: &Envelope,
    ) -> Result<(), RemoteError> {
        self.check_alive()?;
        let requests: Vec<GetValueRequest> = self.receive(requests)?;
        let reply = *self.reply.lock();

        let results: Vec<GetValueResult> = {
            let values = self.values.lock();
            requests
                .into_iter()
                .map(|request| match reply {
                    Reply::Status(status) => GetValueResult::error(request.request_id, status),
                    Reply::Empty => GetValueResult {
                        request_id: request.request_id,
                        status: StatusCode::Ok,
                        prop: None,
                    },
                    _ => {
                        let key = (request.prop.prop_id(), request.prop.area_id());
                        let value = values.get(&key).cloned().unwrap_or(request.prop);
                        GetValueResult::ok(request.request_id, value)
                    }
                })
                .collect()
        };

        let envelope = self
            .transport
            .serialize_vector(&results)
            .map_err(transaction)?;
        self.answer(callback, HeldKind::Get, envelope, reply)
    }

    fn set_values(
        &self,
        callback: Arc<dyn VehicleCallback>,
        requests: &Envelope,
    ) -> Result<(), RemoteError> {
        self.check_alive()?;
        let requests: Vec<SetValueRequest> = self.receive(requests)?;
        let reply = *self.reply.lock();

        let results: Vec<SetValueResult> = requests
            .into_iter()
            .map(|request| match reply {
                Reply::Status(status) => SetValueResult::new(request.request_id, status),
                _ => {
                    let key = (request.value.prop_id(), request.value.area_id());
                    self.values.lock().insert(key, request.value);
                    SetValueResult::new(request.request_id, StatusCode::Ok)
                }
            })
            .collect();

        let envelope = self
            .transport
            .serialize_vector(&results)
            .map_err(transaction)?;
        self.answer(callback, HeldKind::Set, envelope, reply)
    }

    fn get_all_prop_configs(&self) -> Result<Envelope, RemoteError> {
        self.check_alive()?;
        let envelope = self
            .transport
            .serialize_vector(&self.configs)
            .map_err(transaction)?;
        ferry(&envelope).map_err(transaction)
    }

    fn get_prop_configs(&self, prop_ids: &[PropId]) -> Result<Envelope, RemoteError> {
        self.check_alive()?;
        let mut selected = Vec::with_capacity(prop_ids.len());
        for prop_id in prop_ids {
            let config = self
                .configs
                .iter()
                .find(|config| config.prop == *prop_id)
                .ok_or_else(|| RemoteError::ServiceSpecific {
                    code: StatusCode::InvalidArg.as_i32(),
                    message: format!("unknown property {prop_id}"),
                })?;
            selected.push(config.clone());
        }
        let envelope = self
            .transport
            .serialize_vector(&selected)
            .map_err(transaction)?;
        ferry(&envelope).map_err(transaction)
    }
}

/// Death link whose remote can be killed from the test.
#[derive(Default)]
pub struct FakeDeathLink {
    recipient: Mutex<Option<Arc<dyn DeathRecipient>>>,
    pub linked: AtomicUsize,
    pub unlinked: AtomicUsize,
}

impl FakeDeathLink {
    /// Kill the HAL and notify the linked recipient, as the binder driver would.
    pub fn kill(&self, hal: &FakeVehicleHal) {
        hal.kill();
        let recipient = self.recipient.lock().take();
        if let Some(recipient) = recipient {
            recipient.on_binder_died();
        }
    }

    pub fn is_linked(&self) -> bool {
        self.recipient.lock().is_some()
    }
}

impl LinkUnlinkToDeath for FakeDeathLink {
    fn link_to_death(&self, recipient: Arc<dyn DeathRecipient>) -> Result<(), RemoteError> {
        self.linked.fetch_add(1, Ordering::SeqCst);
        *self.recipient.lock() = Some(recipient);
        Ok(())
    }

    fn unlink_to_death(&self, recipient: &Arc<dyn DeathRecipient>) -> Result<(), RemoteError> {
        self.unlinked.fetch_add(1, Ordering::SeqCst);
        let mut current = self.recipient.lock();
        match current.as_ref() {
            Some(linked) if Arc::ptr_eq(linked, recipient) => {
                *current = None;
                drop(current);
                recipient.on_binder_unlinked();
                Ok(())
            }
            _ => Err(RemoteError::DeadObject),
        }
    }
}
