//! In-process parcel.
//!
//! Data is a flat little-endian byte buffer. Descriptors live out of band in
//! a table; the data stream only records a presence flag and the table index,
//! which mirrors how binder keeps object references beside the payload.

use std::os::fd::{BorrowedFd, OwnedFd};

use crate::error::ParcelError;
use crate::ports::Parcel;

const NULL_LENGTH: i32 = -1;

/// Byte buffer plus descriptor table implementing [`Parcel`].
#[derive(Debug, Default)]
pub struct InMemoryParcel {
    data: Vec<u8>,
    position: usize,
    fds: Vec<OwnedFd>,
}

impl InMemoryParcel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a parcel received from elsewhere, positioned at the start.
    pub fn from_parts(data: Vec<u8>, fds: Vec<OwnedFd>) -> Self {
        Self {
            data,
            position: 0,
            fds,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn file_descriptors(&self) -> &[OwnedFd] {
        &self.fds
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<OwnedFd>) {
        (self.data, self.fds)
    }

    fn write_raw(&mut self, bytes: &[u8]) {
        let end = self.position + bytes.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.position..end].copy_from_slice(bytes);
        self.position = end;
    }

    fn read_raw(&mut self, len: usize) -> Result<&[u8], ParcelError> {
        let end = self
            .position
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                ParcelError::deserialization(format!(
                    "read of {len} bytes at {} past end of parcel ({} bytes)",
                    self.position,
                    self.data.len()
                ))
            })?;
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }
}

/// Byte arrays are padded to a 4-byte boundary.
fn padded(len: usize) -> usize {
    (len + 3) & !3
}

impl Parcel for InMemoryParcel {
    fn write_i32(&mut self, value: i32) -> Result<(), ParcelError> {
        self.write_raw(&value.to_le_bytes());
        Ok(())
    }

    fn read_i32(&mut self) -> Result<i32, ParcelError> {
        let raw = self.read_raw(4)?;
        let mut buf = [0u8; 4];
        buf.copy_from_slice(raw);
        Ok(i32::from_le_bytes(buf))
    }

    fn write_bytes(&mut self, bytes: Option<&[u8]>) -> Result<(), ParcelError> {
        let Some(bytes) = bytes else {
            return self.write_i32(NULL_LENGTH);
        };
        let len = i32::try_from(bytes.len()).map_err(|_| {
            ParcelError::serialization(format!("byte array of {} bytes too large", bytes.len()))
        })?;
        self.write_i32(len)?;
        self.write_raw(bytes);
        let padding = padded(bytes.len()) - bytes.len();
        self.write_raw(&[0u8; 3][..padding]);
        Ok(())
    }

    fn read_bytes(&mut self) -> Result<Option<Vec<u8>>, ParcelError> {
        let len = self.read_i32()?;
        if len == NULL_LENGTH {
            return Ok(None);
        }
        let len = usize::try_from(len).map_err(|_| {
            ParcelError::deserialization(format!("invalid byte array length {len}"))
        })?;
        let bytes = self.read_raw(padded(len))?[..len].to_vec();
        Ok(Some(bytes))
    }

    fn write_file_descriptor(&mut self, fd: Option<BorrowedFd<'_>>) -> Result<(), ParcelError> {
        let Some(fd) = fd else {
            return self.write_i32(0);
        };
        let dup = fd.try_clone_to_owned().map_err(|e| {
            ParcelError::serialization(format!("failed to duplicate descriptor: {e}"))
        })?;
        let index = i32::try_from(self.fds.len())
            .map_err(|_| ParcelError::serialization("descriptor table full"))?;
        self.fds.push(dup);
        self.write_i32(1)?;
        self.write_i32(index)
    }

    fn read_file_descriptor(&mut self) -> Result<Option<OwnedFd>, ParcelError> {
        match self.read_i32()? {
            0 => Ok(None),
            1 => {
                let index = self.read_i32()?;
                let fd = usize::try_from(index)
                    .ok()
                    .and_then(|i| self.fds.get(i))
                    .ok_or_else(|| {
                        ParcelError::deserialization(format!("no descriptor at index {index}"))
                    })?;
                let dup = fd.try_clone().map_err(|e| {
                    ParcelError::deserialization(format!("failed to duplicate descriptor: {e}"))
                })?;
                Ok(Some(dup))
            }
            flag => Err(ParcelError::deserialization(format!(
                "invalid descriptor flag {flag}"
            ))),
        }
    }

    fn data_position(&self) -> usize {
        self.position
    }

    fn set_data_position(&mut self, position: usize) -> Result<(), ParcelError> {
        if position > self.data.len() {
            return Err(ParcelError::deserialization(format!(
                "position {position} past end of parcel ({} bytes)",
                self.data.len()
            )));
        }
        self.position = position;
        Ok(())
    }
}
