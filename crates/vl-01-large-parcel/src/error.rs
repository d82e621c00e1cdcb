//! Error types for the large-payload transport

use thiserror::Error;

/// Errors raised while converting between messages and envelopes.
///
/// Every failure is reported synchronously to the caller of the
/// serialize/deserialize operation; there is no partially written region
/// or partially decoded message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParcelError {
    /// The message could not be encoded, or the shared-memory region for it
    /// could not be created or written.
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// The envelope or region could not be read back into a message.
    #[error("Deserialization error: {reason}")]
    Deserialization { reason: String },
}

impl ParcelError {
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }

    pub fn deserialization(reason: impl Into<String>) -> Self {
        Self::Deserialization {
            reason: reason.into(),
        }
    }
}
