//! Error types for the VHAL client

use shared_types::{AreaId, PropId, RequestId, StatusCode};
use thiserror::Error;
use vl_01_large_parcel::ParcelError;
use vl_02_pending_pool::PoolError;

use crate::ports::RemoteError;

/// Outcome of a failed get/set or configuration call.
///
/// Every variant maps to a [`StatusCode`] through [`VhalError::status_code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VhalError {
    #[error("failed to serialize request for prop: {prop_id}, areaId: {area_id}: {source}")]
    Serialization {
        prop_id: PropId,
        area_id: AreaId,
        #[source]
        source: ParcelError,
    },

    #[error("failed to parse {what} returned from VHAL: {source}")]
    Deserialization {
        what: &'static str,
        #[source]
        source: ParcelError,
    },

    /// The remote call itself failed.
    #[error("failed to {operation}: {source}")]
    RemoteCall {
        operation: String,
        #[source]
        source: RemoteError,
    },

    /// The remote call failed because the endpoint is gone.
    #[error("failed to {operation}: VHAL is dead")]
    EndpointDied { operation: String },

    /// The remote answered with a non-OK status for this request.
    #[error("failed to get/set value for propId: {prop_id}, areaId: {area_id}: status: {status}")]
    RemoteStatus {
        prop_id: PropId,
        area_id: AreaId,
        status: StatusCode,
    },

    #[error("failed to get/set value for propId: {prop_id}, areaId: {area_id}: request timed out")]
    Timeout { prop_id: PropId, area_id: AreaId },

    /// A get answered OK but carried no value.
    #[error("failed to get value for propId: {prop_id}, areaId: {area_id}: returns no value")]
    MissingValue { prop_id: PropId, area_id: AreaId },

    #[error("request {request_id} is already pending")]
    DuplicateRequest { request_id: RequestId },

    /// The callback was dropped without being called, which only happens
    /// when the client is torn down while the remote still holds it.
    #[error("request for propId: {prop_id}, areaId: {area_id} was abandoned")]
    Abandoned { prop_id: PropId, area_id: AreaId },

    #[error("VHAL client requires a Tokio runtime")]
    NoRuntime,
}

impl VhalError {
    /// Status code reported to callers that only understand codes.
    pub fn status_code(&self) -> StatusCode {
        match self {
            VhalError::Timeout { .. } => StatusCode::TryAgain,
            VhalError::RemoteStatus { status, .. } => *status,
            VhalError::RemoteCall {
                source: RemoteError::ServiceSpecific { code, .. },
                ..
            } => StatusCode::try_from(*code).unwrap_or(StatusCode::InternalError),
            VhalError::DuplicateRequest { .. } => StatusCode::InvalidArg,
            VhalError::Serialization { .. }
            | VhalError::Deserialization { .. }
            | VhalError::RemoteCall { .. }
            | VhalError::EndpointDied { .. }
            | VhalError::MissingValue { .. }
            | VhalError::Abandoned { .. }
            | VhalError::NoRuntime => StatusCode::InternalError,
        }
    }

    /// Classify a failed remote call.
    pub(crate) fn from_remote(operation: String, source: RemoteError) -> Self {
        match source {
            RemoteError::DeadObject => VhalError::EndpointDied { operation },
            source => VhalError::RemoteCall { operation, source },
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, VhalError::Timeout { .. })
    }
}

impl From<PoolError> for VhalError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::DuplicateRequest { request_id, .. } => {
                VhalError::DuplicateRequest { request_id }
            }
            PoolError::NoRuntime => VhalError::NoRuntime,
        }
    }
}
