//! Pool errors

use shared_types::RequestId;
use thiserror::Error;

use crate::domain::ClientId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The id is already pending in the same group. Nothing from the batch
    /// was registered.
    #[error("Request {request_id} already pending for client {client:?}")]
    DuplicateRequest {
        client: Option<ClientId>,
        request_id: RequestId,
    },

    /// The pool needs a Tokio runtime to run its timeout sweep.
    #[error("No Tokio runtime available for the timeout sweep")]
    NoRuntime,
}
