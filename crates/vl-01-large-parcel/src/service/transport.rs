//! # Payload Transport
//!
//! Converts messages into [`Envelope`]s and back.
//!
//! ## Placement
//!
//! The decision is made on the exact serialized size: up to
//! `max_direct_payload_size` bytes ride inline, anything larger is written
//! into a fresh shared-memory region (`u32` LE length header, then payload)
//! and only the region's descriptor is carried.
//!
//! The receiver never needs to know the sender's threshold. The envelope tag
//! alone says where the bytes are.

use std::os::fd::OwnedFd;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::codec::{decode_each, ParcelDecode, ParcelEncode};
use crate::domain::{Envelope, SharedMemory, TransportConfig};
use crate::error::ParcelError;
use crate::SHARED_MEMORY_HEADER_SIZE;

/// Bytes of payload included in trace-level dumps.
const TRACE_DUMP_BYTES: usize = 64;

/// Serializer/deserializer applying the inline threshold.
#[derive(Clone, Copy, Debug, Default)]
pub struct PayloadTransport {
    config: TransportConfig,
}

impl PayloadTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Serialize `message` into an inline or shared-memory envelope.
    pub fn serialize<T: Serialize + ?Sized>(&self, message: &T) -> Result<Envelope, ParcelError> {
        let len = message.encoded_len()?;
        if !self.config.needs_shared_memory(len) {
            return Ok(Envelope::Inline(message.encode()?));
        }
        let fd = self.spill(message, len)?;
        Ok(Envelope::SharedMemory(fd))
    }

    /// `None` becomes [`Envelope::Null`].
    pub fn serialize_optional<T: Serialize>(
        &self,
        message: Option<&T>,
    ) -> Result<Envelope, ParcelError> {
        match message {
            Some(message) => self.serialize(message),
            None => Ok(Envelope::Null),
        }
    }

    /// Serialize a batch. The threshold applies to the whole encoded vector.
    pub fn serialize_vector<T: Serialize>(&self, items: &[T]) -> Result<Envelope, ParcelError> {
        self.serialize(items)
    }

    pub fn deserialize<T: DeserializeOwned>(
        &self,
        envelope: &Envelope,
    ) -> Result<Option<T>, ParcelError> {
        match envelope {
            Envelope::Null => Ok(None),
            Envelope::Inline(bytes) => T::decode(bytes).map(Some),
            Envelope::SharedMemory(fd) => with_shared_payload(fd, T::decode).map(Some),
        }
    }

    pub fn deserialize_vector<T: DeserializeOwned>(
        &self,
        envelope: &Envelope,
    ) -> Result<Option<Vec<T>>, ParcelError> {
        self.deserialize(envelope)
    }

    /// Decode a vector envelope one element at a time.
    ///
    /// Each element is handed to `f` as soon as it is decoded. On the first
    /// element that fails, decoding stops and the error is returned; the
    /// elements before it have already been delivered. A `Null` envelope
    /// delivers nothing. Returns the number of elements delivered.
    pub fn for_each_in_vector<T, F>(&self, envelope: &Envelope, f: F) -> Result<usize, ParcelError>
    where
        T: DeserializeOwned,
        F: FnMut(T),
    {
        match envelope {
            Envelope::Null => Ok(0),
            Envelope::Inline(bytes) => decode_each(bytes, f),
            Envelope::SharedMemory(fd) => with_shared_payload(fd, |bytes| decode_each(bytes, f)),
        }
    }

    fn spill<T: Serialize + ?Sized>(&self, message: &T, len: usize) -> Result<OwnedFd, ParcelError> {
        let header = u32::try_from(len).map_err(|_| {
            ParcelError::serialization(format!("payload of {len} bytes exceeds the region header"))
        })?;

        let mut region = SharedMemory::create(SHARED_MEMORY_HEADER_SIZE + len).map_err(|e| {
            ParcelError::serialization(format!("failed to create shared memory region: {e}"))
        })?;
        {
            let mut view = region.map_read_write().map_err(|e| {
                ParcelError::serialization(format!("failed to map shared memory region: {e}"))
            })?;
            view[..SHARED_MEMORY_HEADER_SIZE].copy_from_slice(&header.to_le_bytes());
            let payload = &mut view[SHARED_MEMORY_HEADER_SIZE..];
            message.encode_into(payload)?;
            dump("spilled payload to shared memory", payload);
        }

        debug!(
            payload_bytes = len,
            threshold = self.config.max_direct_payload_size,
            "Payload placed in shared memory"
        );
        Ok(region.into_fd())
    }
}

/// Map the region behind `fd`, validate its header and hand the payload to `f`.
///
/// The envelope keeps its own descriptor; the one used here is a duplicate
/// and is closed together with the mapping.
fn with_shared_payload<R>(
    fd: &OwnedFd,
    f: impl FnOnce(&[u8]) -> Result<R, ParcelError>,
) -> Result<R, ParcelError> {
    let dup = fd
        .try_clone()
        .map_err(|e| ParcelError::deserialization(format!("failed to duplicate descriptor: {e}")))?;
    let region = SharedMemory::from_fd(dup).map_err(|e| {
        ParcelError::deserialization(format!("failed to open shared memory region: {e}"))
    })?;
    if region.size() < SHARED_MEMORY_HEADER_SIZE {
        return Err(ParcelError::deserialization(format!(
            "shared memory region of {} bytes has no header",
            region.size()
        )));
    }

    let view = region.map_read_only().map_err(|e| {
        ParcelError::deserialization(format!("failed to map shared memory region: {e}"))
    })?;
    let mut header = [0u8; SHARED_MEMORY_HEADER_SIZE];
    header.copy_from_slice(&view[..SHARED_MEMORY_HEADER_SIZE]);
    let declared = u32::from_le_bytes(header) as usize;

    let available = view.len() - SHARED_MEMORY_HEADER_SIZE;
    if declared > available {
        return Err(ParcelError::deserialization(format!(
            "shared memory region truncated: header declares {declared} bytes, {available} present"
        )));
    }

    let payload = &view[SHARED_MEMORY_HEADER_SIZE..SHARED_MEMORY_HEADER_SIZE + declared];
    dump("read payload from shared memory", payload);
    f(payload)
}

fn dump(message: &str, payload: &[u8]) {
    let head = &payload[..payload.len().min(TRACE_DUMP_BYTES)];
    trace!(len = payload.len(), head = %hex::encode(head), "{message}");
}

/// [`PayloadTransport::serialize`] with the default threshold.
pub fn serialize<T: Serialize + ?Sized>(message: &T) -> Result<Envelope, ParcelError> {
    PayloadTransport::default().serialize(message)
}

/// [`PayloadTransport::serialize_vector`] with the default threshold.
pub fn serialize_vector<T: Serialize>(items: &[T]) -> Result<Envelope, ParcelError> {
    PayloadTransport::default().serialize_vector(items)
}

pub fn deserialize<T: DeserializeOwned>(envelope: &Envelope) -> Result<Option<T>, ParcelError> {
    PayloadTransport::default().deserialize(envelope)
}

pub fn deserialize_vector<T: DeserializeOwned>(
    envelope: &Envelope,
) -> Result<Option<Vec<T>>, ParcelError> {
    PayloadTransport::default().deserialize_vector(envelope)
}
