//! Transport configuration

use serde::{Deserialize, Serialize};

use crate::MAX_DIRECT_PAYLOAD_SIZE;

/// Inline-versus-shared-memory policy.
///
/// Both paths are self-describing on the wire, so sender and receiver do not
/// have to agree on the threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Serialized payloads larger than this go through shared memory.
    pub max_direct_payload_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_direct_payload_size: MAX_DIRECT_PAYLOAD_SIZE,
        }
    }
}

impl TransportConfig {
    /// Builder-style method to set the inline threshold
    pub fn with_max_direct_payload_size(mut self, bytes: usize) -> Self {
        self.max_direct_payload_size = bytes;
        self
    }

    /// Whether a payload of `payload_size` serialized bytes must be spilled.
    pub fn needs_shared_memory(&self, payload_size: usize) -> bool {
        payload_size > self.max_direct_payload_size
    }
}
