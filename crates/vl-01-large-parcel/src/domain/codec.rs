//! Fixed-schema binary codec
//!
//! Every serde type gets the capability through a blanket implementation
//! over `bincode` (fixed-width little-endian integers). A vector encodes as a
//! `u64` element count followed by the elements back to back, which is what
//! lets [`decode_each`] walk a batch one element at a time.

use std::io::Cursor;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ParcelError;

/// Encode side of the codec capability.
pub trait ParcelEncode {
    /// Exact number of bytes [`ParcelEncode::encode`] will produce.
    fn encoded_len(&self) -> Result<usize, ParcelError>;

    fn encode(&self) -> Result<Vec<u8>, ParcelError>;

    /// Encode into `out`, which must be exactly `encoded_len()` bytes long.
    fn encode_into(&self, out: &mut [u8]) -> Result<(), ParcelError>;
}

/// Decode side of the codec capability.
pub trait ParcelDecode: Sized {
    fn decode(bytes: &[u8]) -> Result<Self, ParcelError>;
}

impl<T: Serialize + ?Sized> ParcelEncode for T {
    fn encoded_len(&self) -> Result<usize, ParcelError> {
        let size = bincode::serialized_size(self)
            .map_err(|e| ParcelError::serialization(e.to_string()))?;
        usize::try_from(size)
            .map_err(|_| ParcelError::serialization(format!("payload of {size} bytes too large")))
    }

    fn encode(&self) -> Result<Vec<u8>, ParcelError> {
        bincode::serialize(self).map_err(|e| ParcelError::serialization(e.to_string()))
    }

    fn encode_into(&self, out: &mut [u8]) -> Result<(), ParcelError> {
        bincode::serialize_into(out, self).map_err(|e| ParcelError::serialization(e.to_string()))
    }
}

impl<T: DeserializeOwned> ParcelDecode for T {
    fn decode(bytes: &[u8]) -> Result<Self, ParcelError> {
        bincode::deserialize(bytes).map_err(|e| ParcelError::deserialization(e.to_string()))
    }
}

/// Decode an encoded vector element by element, handing each one to `f`
/// as soon as it is decoded.
///
/// Stops at the first element that fails to decode. Elements before it have
/// already been delivered. Returns the number of elements delivered.
pub fn decode_each<T, F>(bytes: &[u8], mut f: F) -> Result<usize, ParcelError>
where
    T: DeserializeOwned,
    F: FnMut(T),
{
    let mut cursor = Cursor::new(bytes);
    let count: u64 = bincode::deserialize_from(&mut cursor)
        .map_err(|e| ParcelError::deserialization(format!("invalid element count: {e}")))?;

    let mut delivered = 0usize;
    for index in 0..count {
        let item: T = bincode::deserialize_from(&mut cursor).map_err(|e| {
            ParcelError::deserialization(format!("element {index} of {count}: {e}"))
        })?;
        f(item);
        delivered += 1;
    }
    Ok(delivered)
}
