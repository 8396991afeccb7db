//! Memory-mapped peripheral windows
//!
//! A [`MappedRegion`] maps one register block of a memory device
//! (`/dev/gpiomem`, `/dev/mem`) into the process and exposes it as a
//! [`RegisterBank`]. Every access is a single volatile 32-bit load or
//! store, and the mapping is removed when the region is dropped.

use std::fs::OpenOptions;
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use rpi_toolkit_core::registers::RegisterBank;

use super::error::{PlatformError, Result};
use crate::{log_debug, log_warn};

/// One `mmap`ed register block
#[derive(Debug)]
pub struct MappedRegion {
    base: NonNull<u32>,
    len: usize,
    path: PathBuf,
}

// SAFETY: the mapping is owned exclusively by this value and is valid from
// any thread; shared access is serialised by the callers holding it.
unsafe impl Send for MappedRegion {}

impl MappedRegion {
    /// Map `len` bytes of `path` starting at byte `offset`
    ///
    /// `offset` must be page aligned; `len` is rounded up by the kernel.
    pub fn open(path: &Path, offset: u64, len: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC | libc::O_CLOEXEC)
            .open(path)
            .map_err(|e| PlatformError::hardware(format!("open {}", path.display()), e))?;

        let file_offset = libc::off_t::try_from(offset).map_err(|_| {
            PlatformError::hardware(
                format!("offset {:#x} of {}", offset, path.display()),
                std::io::ErrorKind::InvalidInput.into(),
            )
        })?;

        // SAFETY: null hint, valid fd, and the result is checked for MAP_FAILED
        // before use. The mapping outlives `file`, which may be closed after.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                len,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                file_offset,
            )
        };
        if ptr == libc::MAP_FAILED {
            return Err(PlatformError::hardware(
                format!("mmap {} at {:#x}", path.display(), offset),
                std::io::Error::last_os_error(),
            ));
        }
        let base = NonNull::new(ptr.cast::<u32>()).ok_or_else(|| {
            PlatformError::hardware(
                format!("mmap {} at {:#x}", path.display(), offset),
                std::io::ErrorKind::Other.into(),
            )
        })?;

        log_debug!("mapped {} bytes of {} at {:#x}", len, path.display(), offset);
        Ok(Self {
            base,
            len,
            path: path.to_path_buf(),
        })
    }

    /// Device the window was mapped from
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn word(&self, offset: usize) -> *mut u32 {
        assert!(
            offset % 4 == 0 && offset + 4 <= self.len,
            "register offset {:#x} outside {}-byte window",
            offset,
            self.len
        );
        // SAFETY: bounds checked above, so the word lies inside the mapping
        unsafe { self.base.as_ptr().add(offset / 4) }
    }
}

impl RegisterBank for MappedRegion {
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `word` returns an aligned pointer inside the live mapping
        unsafe { self.word(offset).read_volatile() }
    }

    fn write(&mut self, offset: usize, value: u32) {
        // SAFETY: `word` returns an aligned pointer inside the live mapping
        unsafe { self.word(offset).write_volatile(value) }
    }

    fn size(&self) -> usize {
        self.len
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        // SAFETY: base/len are exactly what mmap returned and nothing else
        // references the mapping once its owner is dropped
        let ret = unsafe { libc::munmap(self.base.as_ptr().cast(), self.len) };
        if ret != 0 {
            log_warn!(
                "munmap of {} failed: {}",
                self.path.display(),
                std::io::Error::last_os_error()
            );
        } else {
            log_debug!("unmapped {}", self.path.display());
        }
    }
}
