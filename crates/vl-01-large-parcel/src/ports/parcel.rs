//! # Parcel Port
//!
//! The host application provides the actual IPC container. Envelopes only
//! need a positioned stream of `i32`s, nullable byte arrays and nullable
//! descriptor slots.
//!
//! Production: the platform's parcel implementation
//! Testing: `InMemoryParcel` (adapters/memory_parcel.rs)

use std::os::fd::{BorrowedFd, OwnedFd};

use crate::error::ParcelError;

/// Positioned read/write surface of an IPC parcel.
///
/// Writes happen at the current data position and advance it; writing
/// before the end overwrites in place. Reads advance the position likewise.
pub trait Parcel {
    fn write_i32(&mut self, value: i32) -> Result<(), ParcelError>;

    fn read_i32(&mut self) -> Result<i32, ParcelError>;

    /// Write a nullable byte array. `None` is distinct from an empty slice.
    fn write_bytes(&mut self, bytes: Option<&[u8]>) -> Result<(), ParcelError>;

    fn read_bytes(&mut self) -> Result<Option<Vec<u8>>, ParcelError>;

    /// Write a nullable descriptor slot.
    ///
    /// The parcel keeps its own duplicate; the caller's descriptor is not
    /// consumed.
    fn write_file_descriptor(&mut self, fd: Option<BorrowedFd<'_>>) -> Result<(), ParcelError>;

    /// Read a nullable descriptor slot, returning a descriptor the caller owns.
    fn read_file_descriptor(&mut self) -> Result<Option<OwnedFd>, ParcelError>;

    fn data_position(&self) -> usize;

    fn set_data_position(&mut self, position: usize) -> Result<(), ParcelError>;
}
