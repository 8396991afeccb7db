//! Monotonic clock
//!
//! `CLOCK_MONOTONIC` counts from an unspecified point (usually boot), never
//! goes backwards and ignores wall-clock changes, which is what timers need.

use rpi_toolkit_core::TimeSource;

/// [`TimeSource`] backed by `clock_gettime(CLOCK_MONOTONIC)`
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl MonotonicClock {
    pub const fn new() -> Self {
        Self
    }

    fn now() -> libc::timespec {
        // SAFETY: timespec is plain integers, all-zero is a valid value
        let mut ts: libc::timespec = unsafe { std::mem::zeroed() };
        // SAFETY: `ts` is a valid, writable timespec for the duration of the call
        let ret = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
        if ret != 0 {
            // Nothing time-based can continue without the clock
            panic!(
                "clock_gettime(CLOCK_MONOTONIC) failed: {}",
                std::io::Error::last_os_error()
            );
        }
        ts
    }
}

impl TimeSource for MonotonicClock {
    fn now_ms(&self) -> u64 {
        let ts = Self::now();
        (ts.tv_sec as u64)
            .wrapping_mul(1_000)
            .wrapping_add(ts.tv_nsec as u64 / 1_000_000)
    }

    fn now_us(&self) -> u64 {
        let ts = Self::now();
        (ts.tv_sec as u64)
            .wrapping_mul(1_000_000)
            .wrapping_add(ts.tv_nsec as u64 / 1_000)
    }
}

/// Milliseconds since the monotonic epoch
pub fn millis() -> u64 {
    MonotonicClock.now_ms()
}

/// Microseconds since the monotonic epoch
pub fn micros() -> u64 {
    MonotonicClock.now_us()
}
