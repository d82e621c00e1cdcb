//! Anonymous shared-memory regions.
//!
//! A region is a sealed-off memfd: it has no name in any filesystem, and the
//! only way to reach it from another process is to be handed its descriptor.
//! Mappings are RAII guards that unmap on drop; the region itself closes its
//! descriptor on drop.

use std::fs::File;
use std::io;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, FromRawFd, OwnedFd};

/// Anonymous memory region addressable by file descriptor.
#[derive(Debug)]
pub struct SharedMemory {
    file: File,
    size: usize,
}

impl SharedMemory {
    /// Create a new zero-filled region of `size` bytes.
    pub fn create(size: usize) -> io::Result<Self> {
        let fd = memfd()?;
        let file = File::from(fd);
        file.set_len(size as u64)?;
        Ok(Self { file, size })
    }

    /// Adopt a region received from another process.
    ///
    /// The size is taken from the descriptor itself.
    pub fn from_fd(fd: OwnedFd) -> io::Result<Self> {
        let file = File::from(fd);
        let len = file.metadata()?.len();
        let size = usize::try_from(len).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "region does not fit in memory")
        })?;
        Ok(Self { file, size })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Grow or shrink the region. New bytes read as zero.
    pub fn resize(&mut self, size: usize) -> io::Result<()> {
        self.file.set_len(size as u64)?;
        self.size = size;
        Ok(())
    }

    /// Map the whole region for writing.
    pub fn map_read_write(&mut self) -> io::Result<ReadWriteMapping<'_>> {
        let ptr = map(&self.file, self.size, libc::PROT_READ | libc::PROT_WRITE)?;
        Ok(ReadWriteMapping {
            ptr,
            len: self.size,
            _region: PhantomData,
        })
    }

    /// Map the whole region for reading.
    pub fn map_read_only(&self) -> io::Result<ReadOnlyMapping<'_>> {
        let ptr = map(&self.file, self.size, libc::PROT_READ)?;
        Ok(ReadOnlyMapping {
            ptr,
            len: self.size,
            _region: PhantomData,
        })
    }

    /// Duplicate the descriptor, e.g. to hand it to another process.
    pub fn try_clone_fd(&self) -> io::Result<OwnedFd> {
        self.file.as_fd().try_clone_to_owned()
    }

    pub fn into_fd(self) -> OwnedFd {
        OwnedFd::from(self.file)
    }
}

impl AsFd for SharedMemory {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.file.as_fd()
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn memfd() -> io::Result<OwnedFd> {
    // SAFETY: the name is a valid NUL-terminated string and the flags are
    // a valid combination for memfd_create.
    let raw = unsafe { libc::memfd_create(c"vhal-large-parcel".as_ptr(), libc::MFD_CLOEXEC) };
    if raw < 0 {
        return Err(io::Error::last_os_error());
    }
    // SAFETY: memfd_create returned a fresh descriptor that nothing else owns.
    Ok(unsafe { OwnedFd::from_raw_fd(raw) })
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn memfd() -> io::Result<OwnedFd> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "anonymous shared memory requires memfd_create",
    ))
}

fn map(file: &File, len: usize, prot: libc::c_int) -> io::Result<*mut u8> {
    if len == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "cannot map an empty region",
        ));
    }

    // SAFETY: the descriptor is open for the duration of the call and the
    // kernel validates length and protection against it.
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            prot,
            libc::MAP_SHARED,
            file.as_raw_fd(),
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(io::Error::last_os_error());
    }
    Ok(ptr.cast::<u8>())
}

fn unmap(ptr: *mut u8, len: usize) {
    // SAFETY: ptr/len came from a successful mmap and are unmapped only once.
    unsafe {
        libc::munmap(ptr.cast::<libc::c_void>(), len);
    }
}

/// Writable view of a [`SharedMemory`] region.
pub struct ReadWriteMapping<'a> {
    ptr: *mut u8,
    len: usize,
    _region: PhantomData<&'a mut SharedMemory>,
}

impl Deref for ReadWriteMapping<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: the mapping is valid for len bytes until drop.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl DerefMut for ReadWriteMapping<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        // SAFETY: the mapping is writable and exclusively borrowed.
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

impl Drop for ReadWriteMapping<'_> {
    fn drop(&mut self) {
        unmap(self.ptr, self.len);
    }
}

/// Read-only view of a [`SharedMemory`] region.
pub struct ReadOnlyMapping<'a> {
    ptr: *mut u8,
    len: usize,
    _region: PhantomData<&'a SharedMemory>,
}

impl Deref for ReadOnlyMapping<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        // SAFETY: the mapping is valid for len bytes until drop.
        unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
    }
}

impl Drop for ReadOnlyMapping<'_> {
    fn drop(&mut self) {
        unmap(self.ptr, self.len);
    }
}
