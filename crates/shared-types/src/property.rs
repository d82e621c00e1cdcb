//! # Property Values and Get/Set Records
//!
//! The payloads carried by `getValues` / `setValues` calls and their
//! asynchronous results.

use serde::{Deserialize, Serialize};

use crate::status::StatusCode;

/// Property identifier as assigned by the vehicle HAL.
pub type PropId = i32;

/// Area identifier within a property (0 for global properties).
pub type AreaId = i32;

/// Caller-assigned request identifier.
pub type RequestId = i64;

/// Availability of a property value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehiclePropertyStatus {
    #[default]
    Available,
    Unavailable,
    Error,
}

/// Raw typed storage for a property value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPropValues {
    pub int32_values: Vec<i32>,
    pub float_values: Vec<f32>,
    pub int64_values: Vec<i64>,
    pub byte_values: Vec<u8>,
    pub string_value: String,
}

/// A single property value, used both as a request key and as a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclePropValue {
    /// Elapsed realtime in nanoseconds when the value was sampled.
    pub timestamp: i64,
    pub area_id: AreaId,
    pub prop: PropId,
    pub status: VehiclePropertyStatus,
    pub value: RawPropValues,
}

impl VehiclePropValue {
    /// Create an empty value addressing `prop` in `area_id`.
    #[must_use]
    pub fn new(prop: PropId, area_id: AreaId) -> Self {
        Self {
            prop,
            area_id,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_int32_values(mut self, values: Vec<i32>) -> Self {
        self.value.int32_values = values;
        self
    }

    #[must_use]
    pub fn with_float_values(mut self, values: Vec<f32>) -> Self {
        self.value.float_values = values;
        self
    }

    #[must_use]
    pub fn with_byte_values(mut self, values: Vec<u8>) -> Self {
        self.value.byte_values = values;
        self
    }

    #[must_use]
    pub fn with_string_value(mut self, value: impl Into<String>) -> Self {
        self.value.string_value = value.into();
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn prop_id(&self) -> PropId {
        self.prop
    }

    #[must_use]
    pub fn area_id(&self) -> AreaId {
        self.area_id
    }
}

/// One entry of a `getValues` batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetValueRequest {
    pub request_id: RequestId,
    pub prop: VehiclePropValue,
}

/// Result for one `GetValueRequest`.
///
/// `prop` may be absent even when `status` is OK; the client reports that
/// as a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetValueResult {
    pub request_id: RequestId,
    pub status: StatusCode,
    pub prop: Option<VehiclePropValue>,
}

impl GetValueResult {
    #[must_use]
    pub fn ok(request_id: RequestId, prop: VehiclePropValue) -> Self {
        Self {
            request_id,
            status: StatusCode::Ok,
            prop: Some(prop),
        }
    }

    #[must_use]
    pub fn error(request_id: RequestId, status: StatusCode) -> Self {
        Self {
            request_id,
            status,
            prop: None,
        }
    }
}

/// One entry of a `setValues` batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetValueRequest {
    pub request_id: RequestId,
    pub value: VehiclePropValue,
}

/// Result for one `SetValueRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetValueResult {
    pub request_id: RequestId,
    pub status: StatusCode,
}

impl SetValueResult {
    #[must_use]
    pub fn new(request_id: RequestId, status: StatusCode) -> Self {
        Self { request_id, status }
    }
}
