//! Get/set correlation.
//!
//! Keeps one pending callback per outstanding request id and uses the
//! pending-request pool as the arbiter between a response and a timeout:
//! a callback is only taken out of the table after the pool has handed the
//! id over, so it runs exactly once.
//!
//! Lock order is client table, then pool. Timeout callbacks run without the
//! pool lock and take the table lock themselves.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use shared_types::{
    AreaId, GetValueRequest, GetValueResult, PropId, RequestId, SetValueRequest, SetValueResult,
    VehiclePropValue,
};
use tracing::{debug, error, trace, warn};
use vl_01_large_parcel::{Envelope, PayloadTransport};
use vl_02_pending_pool::{ClientId, PendingRequestPool, TimeoutCallback};

use crate::config::ClientConfig;
use crate::error::VhalError;
use crate::ports::{RemoteError, VehicleCallback, VehicleHal};

/// Callback receiving the single outcome of a request.
pub type ResultCallback<T> = Box<dyn FnOnce(Result<T, VhalError>) + Send>;

pub type GetValueCallback = ResultCallback<VehiclePropValue>;

pub type SetValueCallback = ResultCallback<()>;

struct PendingRequest<T> {
    callback: ResultCallback<T>,
    prop_id: PropId,
    area_id: AreaId,
}

impl<T> PendingRequest<T> {
    fn new(callback: ResultCallback<T>, value: &VehiclePropValue) -> Self {
        Self {
            callback,
            prop_id: value.prop_id(),
            area_id: value.area_id(),
        }
    }

    fn finish(self, outcome: Result<T, VhalError>) {
        (self.callback)(outcome)
    }

    fn time_out(self) {
        let err = VhalError::Timeout {
            prop_id: self.prop_id,
            area_id: self.area_id,
        };
        self.finish(Err(err))
    }
}

#[derive(Default)]
struct PendingCallbacks {
    get: HashMap<RequestId, PendingRequest<VehiclePropValue>>,
    set: HashMap<RequestId, PendingRequest<()>>,
}

impl PendingCallbacks {
    fn get_table(&mut self) -> &mut HashMap<RequestId, PendingRequest<VehiclePropValue>> {
        &mut self.get
    }

    fn set_table(&mut self) -> &mut HashMap<RequestId, PendingRequest<()>> {
        &mut self.set
    }
}

type Table<T> = fn(&mut PendingCallbacks) -> &mut HashMap<RequestId, PendingRequest<T>>;

/// Where a request kind lives: its pool group, its callback table and
/// the wording used in errors.
struct Route<T> {
    group: ClientId,
    table: Table<T>,
    operation: &'static str,
}

const GET_ROUTE: Route<VehiclePropValue> = Route {
    group: ClientId(0),
    table: PendingCallbacks::get_table,
    operation: "get value",
};

const SET_ROUTE: Route<()> = Route {
    group: ClientId(1),
    table: PendingCallbacks::set_table,
    operation: "set value",
};

/// Take the pending callbacks for ids the pool reported as expired.
fn take_expired<T>(
    pending: &Mutex<PendingCallbacks>,
    route: &Route<T>,
    ids: &HashSet<RequestId>,
) -> Vec<PendingRequest<T>> {
    let mut guard = pending.lock();
    let table = (route.table)(&mut guard);
    ids.iter()
        .filter_map(|id| {
            let entry = table.remove(id);
            if entry.is_none() {
                warn!(
                    request_id = id,
                    operation = route.operation,
                    "Failed to find the timed-out pending request, ignore"
                );
            }
            entry
        })
        .collect()
}

/// Issues get/set batches and resolves their callbacks.
pub struct GetSetValueClient {
    // Dropped first, so outstanding callbacks fire as timed out.
    pool: PendingRequestPool,
    pending: Arc<Mutex<PendingCallbacks>>,
    on_get_timeout: TimeoutCallback,
    on_set_timeout: TimeoutCallback,
    hal: Arc<dyn VehicleHal>,
    transport: PayloadTransport,
}

impl GetSetValueClient {
    /// Must be called inside a Tokio runtime; the pool's sweep runs on it.
    pub fn new(hal: Arc<dyn VehicleHal>, config: &ClientConfig) -> Result<Self, VhalError> {
        let pool = PendingRequestPool::new(config.pool_config())?;
        let pending = Arc::new(Mutex::new(PendingCallbacks::default()));

        let on_get_timeout: TimeoutCallback = {
            let pending = Arc::clone(&pending);
            Arc::new(move |ids: &HashSet<RequestId>| {
                for entry in take_expired(&pending, &GET_ROUTE, ids) {
                    entry.time_out();
                }
            })
        };
        let on_set_timeout: TimeoutCallback = {
            let pending = Arc::clone(&pending);
            Arc::new(move |ids: &HashSet<RequestId>| {
                for entry in take_expired(&pending, &SET_ROUTE, ids) {
                    entry.time_out();
                }
            })
        };

        Ok(Self {
            pool,
            pending,
            on_get_timeout,
            on_set_timeout,
            hal,
            transport: PayloadTransport::new(config.transport),
        })
    }

    /// Send a one-element get batch. `callback` runs exactly once.
    pub fn get_value(
        self: &Arc<Self>,
        request_id: RequestId,
        value: &VehiclePropValue,
        callback: GetValueCallback,
    ) {
        let request = GetValueRequest {
            request_id,
            prop: value.clone(),
        };
        let entry = PendingRequest::new(callback, value);
        let Some(envelope) =
            self.prepare(&GET_ROUTE, &self.on_get_timeout, request_id, &[request], entry)
        else {
            return;
        };
        let sent = self.hal.get_values(self.as_callback(), &envelope);
        self.check_sent(&GET_ROUTE, request_id, sent);
    }

    /// Send a one-element set batch. `callback` runs exactly once.
    pub fn set_value(
        self: &Arc<Self>,
        request_id: RequestId,
        value: &VehiclePropValue,
        callback: SetValueCallback,
    ) {
        let request = SetValueRequest {
            request_id,
            value: value.clone(),
        };
        let entry = PendingRequest::new(callback, value);
        let Some(envelope) =
            self.prepare(&SET_ROUTE, &self.on_set_timeout, request_id, &[request], entry)
        else {
            return;
        };
        let sent = self.hal.set_values(self.as_callback(), &envelope);
        self.check_sent(&SET_ROUTE, request_id, sent);
    }

    /// Requests still waiting for a response or a timeout.
    pub fn count_pending_requests(&self) -> usize {
        self.pool.total_pending_requests()
    }

    fn as_callback(self: &Arc<Self>) -> Arc<dyn VehicleCallback> {
        Arc::clone(self) as Arc<dyn VehicleCallback>
    }

    /// Serialize the batch and register the request.
    ///
    /// On failure the callback has already been invoked and `None` is returned.
    fn prepare<T, R: Serialize>(
        &self,
        route: &Route<T>,
        on_timeout: &TimeoutCallback,
        request_id: RequestId,
        requests: &[R],
        entry: PendingRequest<T>,
    ) -> Option<Envelope> {
        let envelope = match self.transport.serialize_vector(requests) {
            Ok(envelope) => envelope,
            Err(source) => {
                let err = VhalError::Serialization {
                    prop_id: entry.prop_id,
                    area_id: entry.area_id,
                    source,
                };
                entry.finish(Err(err));
                return None;
            }
        };

        let mut pending = self.pending.lock();
        if let Err(err) =
            self.pool
                .add_requests(Some(route.group), [request_id], Arc::clone(on_timeout))
        {
            drop(pending);
            entry.finish(Err(err.into()));
            return None;
        }
        (route.table)(&mut pending).insert(request_id, entry);
        drop(pending);

        trace!(
            request_id,
            operation = route.operation,
            presence = %envelope.presence(),
            "Request registered"
        );
        Some(envelope)
    }

    /// Resolve a request whose send failed synchronously.
    fn check_sent<T>(&self, route: &Route<T>, request_id: RequestId, sent: Result<(), RemoteError>) {
        let Err(source) = sent else {
            return;
        };
        let Some(entry) = self.try_finish(route, request_id) else {
            return;
        };
        let operation = format!(
            "{} for prop: {}, areaId: {}",
            route.operation, entry.prop_id, entry.area_id
        );
        entry.finish(Err(VhalError::from_remote(operation, source)));
    }

    /// Claim a request from the pool and take its callback.
    fn try_finish<T>(&self, route: &Route<T>, request_id: RequestId) -> Option<PendingRequest<T>> {
        let mut pending = self.pending.lock();
        if self
            .pool
            .try_finish_requests(Some(route.group), &[request_id])
            .is_empty()
        {
            return None;
        }
        (route.table)(&mut pending).remove(&request_id)
    }

    fn on_get_value(&self, result: GetValueResult) {
        let Some(entry) = self.try_finish(&GET_ROUTE, result.request_id) else {
            debug!(
                request_id = result.request_id,
                "Failed to find pending request, maybe already timed out"
            );
            return;
        };

        let outcome = if !result.status.is_ok() {
            Err(VhalError::RemoteStatus {
                prop_id: entry.prop_id,
                area_id: entry.area_id,
                status: result.status,
            })
        } else {
            result.prop.ok_or(VhalError::MissingValue {
                prop_id: entry.prop_id,
                area_id: entry.area_id,
            })
        };
        entry.finish(outcome);
    }

    fn on_set_value(&self, result: SetValueResult) {
        let Some(entry) = self.try_finish(&SET_ROUTE, result.request_id) else {
            debug!(
                request_id = result.request_id,
                "Failed to find pending request, maybe already timed out"
            );
            return;
        };

        let outcome = if result.status.is_ok() {
            Ok(())
        } else {
            Err(VhalError::RemoteStatus {
                prop_id: entry.prop_id,
                area_id: entry.area_id,
                status: result.status,
            })
        };
        entry.finish(outcome);
    }
}

impl VehicleCallback for GetSetValueClient {
    fn on_get_values(&self, results: Envelope) -> Result<(), VhalError> {
        self.transport
            .for_each_in_vector::<GetValueResult, _>(&results, |result| self.on_get_value(result))
            .map(|count| trace!(count, "Get results delivered"))
            .map_err(|source| {
                error!(error = %source, "Failed to parse GetValueResults returned from VHAL");
                VhalError::Deserialization {
                    what: "GetValueResults",
                    source,
                }
            })
    }

    fn on_set_values(&self, results: Envelope) -> Result<(), VhalError> {
        self.transport
            .for_each_in_vector::<SetValueResult, _>(&results, |result| self.on_set_value(result))
            .map(|count| trace!(count, "Set results delivered"))
            .map_err(|source| {
                error!(error = %source, "Failed to parse SetValueResults returned from VHAL");
                VhalError::Deserialization {
                    what: "SetValueResults",
                    source,
                }
            })
    }
}
