//! DRAM Buffer Implementation.
//!
//! This module provides a safe wrapper around raw memory allocation for one
//! guest memory region. On Unix it allocates lazily via `mmap`, so a 256 MiB
//! region costs nothing until the guest touches it.

use std::fmt;
use std::slice;

use crate::common::error::{HammerError, Result};

/// Zero-initialised backing storage for one memory region.
///
/// On Unix systems, this uses `mmap` to allocate anonymous memory, which allows
/// for lazy allocation (pages are only allocated by the OS when accessed).
pub struct DramBuffer {
    ptr: *mut u8,
    size: usize,
    is_mmap: bool,
}

// SAFETY: `DramBuffer` owns its allocation exclusively. Shared references only
// permit reads and every write goes through `&mut self`, so the usual borrow
// rules serialise access across threads.
unsafe impl Send for DramBuffer {}
// SAFETY: see `Send` above; no interior mutability is exposed through `&self`.
unsafe impl Sync for DramBuffer {}

impl DramBuffer {
    /// Allocates a zero-filled buffer of `size` bytes.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the host refuses the mapping.
    pub fn new(size: usize) -> Result<Self> {
        #[cfg(unix)]
        {
            // SAFETY: anonymous private mapping with no address hint; the
            // arguments are valid for any `size` and failure is reported as
            // `MAP_FAILED`, checked below.
            let ptr = unsafe {
                libc::mmap(
                    std::ptr::null_mut(),
                    size,
                    libc::PROT_READ | libc::PROT_WRITE,
                    libc::MAP_PRIVATE | libc::MAP_ANONYMOUS | libc::MAP_NORESERVE,
                    -1,
                    0,
                )
            };

            if ptr == libc::MAP_FAILED {
                return Err(HammerError::InvalidConfig(format!(
                    "failed to map {size:#x} bytes of guest memory: {}",
                    std::io::Error::last_os_error()
                )));
            }

            Ok(Self {
                ptr: ptr.cast::<u8>(),
                size,
                is_mmap: true,
            })
        }

        #[cfg(not(unix))]
        {
            let mut vec = vec![0u8; size].into_boxed_slice();
            let ptr = vec.as_mut_ptr();
            std::mem::forget(vec);
            Ok(Self {
                ptr,
                size,
                is_mmap: false,
            })
        }
    }

    /// Returns the size of the buffer in bytes.
    pub const fn len(&self) -> usize {
        self.size
    }

    /// True for a zero-length buffer.
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Borrows `len` bytes at `offset`, or `None` if the range leaves the buffer.
    pub fn read_slice(&self, offset: usize, len: usize) -> Option<&[u8]> {
        let end = offset.checked_add(len)?;
        if end > self.size {
            return None;
        }
        // SAFETY: `offset..end` lies inside the live allocation of `size`
        // bytes, and the returned borrow is tied to `&self`.
        Some(unsafe { slice::from_raw_parts(self.ptr.add(offset), len) })
    }

    /// Copies `data` to `offset`. Returns `false` without writing if the range
    /// leaves the buffer.
    pub fn write_slice(&mut self, offset: usize, data: &[u8]) -> bool {
        let Some(end) = offset.checked_add(data.len()) else {
            return false;
        };
        if end > self.size {
            return false;
        }
        // SAFETY: the destination range is inside the allocation (checked
        // above) and cannot overlap `data`, which is a separate borrow.
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), self.ptr.add(offset), data.len());
        }
        true
    }
}

impl fmt::Debug for DramBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DramBuffer")
            .field("size", &self.size)
            .field("is_mmap", &self.is_mmap)
            .finish_non_exhaustive()
    }
}

impl Drop for DramBuffer {
    /// Releases the mapping (Unix) or the boxed slice (elsewhere).
    fn drop(&mut self) {
        if self.is_mmap {
            #[cfg(unix)]
            // SAFETY: `ptr`/`size` are exactly what `mmap` returned and the
            // mapping is unmapped once, here.
            unsafe {
                let _ = libc::munmap(self.ptr.cast::<libc::c_void>(), self.size);
            }
        } else {
            #[cfg(not(unix))]
            // SAFETY: `ptr`/`size` came from a leaked `Box<[u8]>` of that length.
            unsafe {
                drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    self.ptr, self.size,
                )));
            }
        }
    }
}
