//! Process-wide driver slots
//!
//! The C ABI has no handle to thread a driver through, so the drivers it
//! uses live in statics. A [`DriverSlot`] is either empty (before init,
//! after cleanup) or holds one driver; every access to an empty slot is
//! `NotInitialized`.

use std::sync::{Mutex, MutexGuard};

use super::error::{PlatformError, Result};

/// Holder for a driver that is initialised at most once at a time
#[derive(Debug)]
pub struct DriverSlot<T> {
    inner: Mutex<Option<T>>,
}

impl<T> DriverSlot<T> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<T>> {
        // A panic while holding the lock cannot leave the Option torn
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a driver
    ///
    /// # Errors
    ///
    /// `AlreadyInitialized` if the slot is occupied; `driver` is dropped.
    pub fn install(&self, driver: T) -> Result<()> {
        let mut slot = self.lock();
        if slot.is_some() {
            return Err(PlatformError::AlreadyInitialized);
        }
        *slot = Some(driver);
        Ok(())
    }

    /// Fill an empty slot with the result of `init`; an occupied slot is
    /// left untouched and `init` is not called
    pub fn get_or_install<F>(&self, init: F) -> Result<()>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut slot = self.lock();
        if slot.is_none() {
            *slot = Some(init()?);
        }
        Ok(())
    }

    /// Empty the slot, returning the driver it held
    pub fn take(&self) -> Option<T> {
        self.lock().take()
    }

    /// Run `f` on the installed driver
    ///
    /// # Errors
    ///
    /// `NotInitialized` if the slot is empty, else whatever `f` returns.
    pub fn with<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> Result<R>,
    {
        let mut slot = self.lock();
        let driver = slot.as_mut().ok_or(PlatformError::NotInitialized)?;
        f(driver)
    }

    pub fn is_installed(&self) -> bool {
        self.lock().is_some()
    }
}

impl<T> Default for DriverSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
