//! Parcel framing over a Unix domain socket.
//!
//! ```text
//! u32 LE data length | data | u32 LE descriptor count | one SCM_RIGHTS message per descriptor
//! ```
//!
//! Descriptors remain valid in the sender; the receiver gets new ones that
//! refer to the same kernel objects.

use std::io::{self, Read, Write};
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
use std::os::unix::net::UnixStream;

use passfd::FdPassingExt;
use tracing::trace;

use super::memory_parcel::InMemoryParcel;

/// Largest parcel body accepted from a peer.
pub const MAX_FRAME_BYTES: usize = 1 << 20;

/// Kernel limit on descriptors in flight per message batch.
pub const MAX_FRAME_FDS: usize = 253;

/// Send `parcel` over `stream`, descriptors included.
pub fn send_parcel(stream: &UnixStream, parcel: &InMemoryParcel) -> io::Result<()> {
    let data = parcel.data();
    let fds = parcel.file_descriptors();
    if data.len() > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("parcel of {} bytes exceeds frame limit", data.len()),
        ));
    }
    if fds.len() > MAX_FRAME_FDS {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("parcel carries {} descriptors", fds.len()),
        ));
    }

    let mut writer = stream;
    writer.write_all(&(data.len() as u32).to_le_bytes())?;
    writer.write_all(data)?;
    writer.write_all(&(fds.len() as u32).to_le_bytes())?;
    for fd in fds {
        stream.as_raw_fd().send_fd(fd.as_raw_fd())?;
    }
    trace!(bytes = data.len(), fds = fds.len(), "sent parcel");
    Ok(())
}

/// Receive one parcel sent with [`send_parcel`].
pub fn recv_parcel(stream: &UnixStream) -> io::Result<InMemoryParcel> {
    let mut reader = stream;

    let len = read_u32(&mut reader)? as usize;
    if len > MAX_FRAME_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("peer announced {len} byte parcel"),
        ));
    }
    let mut data = vec![0u8; len];
    reader.read_exact(&mut data)?;

    let count = read_u32(&mut reader)? as usize;
    if count > MAX_FRAME_FDS {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("peer announced {count} descriptors"),
        ));
    }
    let mut fds = Vec::with_capacity(count);
    for _ in 0..count {
        let raw = stream.as_raw_fd().recv_fd()?;
        // SAFETY: recv_fd hands over a freshly installed descriptor.
        fds.push(unsafe { OwnedFd::from_raw_fd(raw) });
    }
    trace!(bytes = len, fds = count, "received parcel");
    Ok(InMemoryParcel::from_parts(data, fds))
}

fn read_u32(reader: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
