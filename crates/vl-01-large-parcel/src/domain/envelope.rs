//! The envelope: the unit that actually crosses the IPC boundary.

use std::fmt;
use std::io;
use std::os::fd::{AsFd, OwnedFd};

use crate::error::ParcelError;
use crate::ports::Parcel;

const TAG_NULL: i32 = 0;
const TAG_PRESENT: i32 = 1;

/// Size of the leading total-size field, which counts itself.
const SIZE_FIELD_LEN: i32 = 4;

/// Which representation an [`Envelope`] carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Presence {
    Null,
    Inline,
    SharedMemory,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Null => write!(f, "NULL"),
            Presence::Inline => write!(f, "INLINE"),
            Presence::SharedMemory => write!(f, "SHARED_MEMORY"),
        }
    }
}

/// Self-describing wire representation of a possibly absent message.
///
/// `Null` is an absent value and is distinct from `Inline` with zero bytes.
/// `SharedMemory` owns the region's descriptor; dropping the envelope closes it.
#[derive(Debug)]
pub enum Envelope {
    Null,
    Inline(Vec<u8>),
    SharedMemory(OwnedFd),
}

impl Envelope {
    pub fn presence(&self) -> Presence {
        match self {
            Envelope::Null => Presence::Null,
            Envelope::Inline(_) => Presence::Inline,
            Envelope::SharedMemory(_) => Presence::SharedMemory,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Envelope::Null)
    }

    /// Copy the envelope. A shared-memory descriptor is duplicated, so both
    /// copies refer to the same region.
    pub fn try_clone(&self) -> io::Result<Self> {
        Ok(match self {
            Envelope::Null => Envelope::Null,
            Envelope::Inline(bytes) => Envelope::Inline(bytes.clone()),
            Envelope::SharedMemory(fd) => Envelope::SharedMemory(fd.try_clone()?),
        })
    }

    /// Write the envelope section at the parcel's current position.
    ///
    /// Layout: `i32` total size (including itself), `i32` presence, then for
    /// a present value a nullable byte array followed by a nullable
    /// descriptor slot. The size is back-patched once the body is written.
    pub fn write_to_parcel<P: Parcel + ?Sized>(&self, parcel: &mut P) -> Result<(), ParcelError> {
        let start = parcel.data_position();
        parcel.write_i32(0)?;

        match self {
            Envelope::Null => parcel.write_i32(TAG_NULL)?,
            Envelope::Inline(bytes) => {
                parcel.write_i32(TAG_PRESENT)?;
                parcel.write_bytes(Some(bytes))?;
                parcel.write_file_descriptor(None)?;
            }
            Envelope::SharedMemory(fd) => {
                parcel.write_i32(TAG_PRESENT)?;
                parcel.write_bytes(None)?;
                parcel.write_file_descriptor(Some(fd.as_fd()))?;
            }
        }

        let end = parcel.data_position();
        let total = i32::try_from(end - start)
            .map_err(|_| ParcelError::serialization("envelope section exceeds i32 range"))?;
        parcel.set_data_position(start)?;
        parcel.write_i32(total)?;
        parcel.set_data_position(end)?;
        Ok(())
    }

    /// Read an envelope section written by [`Envelope::write_to_parcel`].
    ///
    /// Leaves the parcel positioned right after the section as declared by
    /// its size field.
    pub fn read_from_parcel<P: Parcel + ?Sized>(parcel: &mut P) -> Result<Self, ParcelError> {
        let start = parcel.data_position();
        let total = parcel.read_i32()?;
        if total < SIZE_FIELD_LEN {
            return Err(ParcelError::deserialization(format!(
                "invalid envelope size {total}"
            )));
        }
        let section_end = start + total as usize;

        let envelope = match parcel.read_i32()? {
            TAG_NULL => Envelope::Null,
            TAG_PRESENT => {
                let bytes = parcel.read_bytes()?;
                let fd = parcel.read_file_descriptor()?;
                match (bytes, fd) {
                    (Some(bytes), None) => Envelope::Inline(bytes),
                    (None, Some(fd)) => Envelope::SharedMemory(fd),
                    (Some(_), Some(_)) => {
                        return Err(ParcelError::deserialization(
                            "envelope carries both inline bytes and a descriptor",
                        ))
                    }
                    (None, None) => {
                        return Err(ParcelError::deserialization(
                            "envelope marked present but carries no payload",
                        ))
                    }
                }
            }
            tag => {
                return Err(ParcelError::deserialization(format!(
                    "unknown envelope presence tag {tag}"
                )))
            }
        };

        if parcel.data_position() > section_end {
            return Err(ParcelError::deserialization(format!(
                "envelope body overruns its declared size {total}"
            )));
        }
        parcel.set_data_position(section_end)?;
        Ok(envelope)
    }
}

impl From<Vec<u8>> for Envelope {
    fn from(bytes: Vec<u8>) -> Self {
        Envelope::Inline(bytes)
    }
}

impl From<OwnedFd> for Envelope {
    fn from(fd: OwnedFd) -> Self {
        Envelope::SharedMemory(fd)
    }
}
