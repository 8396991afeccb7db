//! Linux platform layer
//!
//! Maps the peripheral blocks the register drivers in `rpi_toolkit_core`
//! operate on, and supplies the monotonic clock.
//!
//! - [`clock`]: `CLOCK_MONOTONIC` time source
//! - [`mmap`]: `mmap`ed register windows
//! - [`gpio`]: GPIO block lifecycle
//! - [`pwm`]: PWM and PWM clock lifecycle
//! - [`slot`]: process-wide driver holders for the C ABI

pub mod clock;
pub mod error;
pub mod gpio;
pub mod mmap;
pub mod pwm;
pub mod slot;

use std::sync::atomic::{AtomicBool, Ordering};

pub use clock::{micros, millis, MonotonicClock};
pub use error::{PlatformError, Result};
pub use gpio::{GpioDriver, GpioMem};
pub use mmap::MappedRegion;
pub use pwm::{HwPwmDriver, PwmMem};
pub use slot::DriverSlot;

/// Exclusive hold on a process-wide resource flag, released on drop
#[derive(Debug)]
pub(crate) struct Claim {
    flag: &'static AtomicBool,
}

impl Claim {
    pub(crate) fn acquire(flag: &'static AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PlatformError::AlreadyInitialized)?;
        Ok(Self { flag })
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
