//! Monotonic time source abstraction.
//!
//! `TimeSource` decouples timers and PWM state machines from the clock they
//! read, so the same code runs against `CLOCK_MONOTONIC` on the board and
//! against `MockTime` in tests.

use core::cell::Cell;

/// Monotonic millisecond/microsecond clock.
///
/// Implementations count from an arbitrary but fixed epoch, never run
/// backwards, and are not affected by wall-clock adjustments.
///
/// # Example
///
/// ```
/// use rpi_toolkit_core::traits::{MockTime, TimeSource};
///
/// fn poll<T: TimeSource>(time: &T, last_us: &mut u64) -> bool {
///     if time.elapsed_since(*last_us) >= 20_000 {
///         *last_us = time.now_us();
///         return true;
///     }
///     false
/// }
///
/// let time = MockTime::new();
/// let mut last = 0;
/// time.advance_ms(20);
/// assert!(poll(&time, &mut last));
/// ```
pub trait TimeSource {
    /// Returns current time in milliseconds since the clock's epoch.
    fn now_ms(&self) -> u64;

    /// Returns current time in microseconds since the clock's epoch.
    fn now_us(&self) -> u64;

    /// Returns elapsed time in microseconds since a reference point.
    ///
    /// Uses saturating subtraction so a reference in the future yields 0.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

// ============================================================================
// Mock Implementation (always available for testing)
// ============================================================================

/// Mock time source with explicit time advancement.
///
/// Lets tests drive timers and PWM state machines deterministically, one
/// simulated poll at a time.
///
/// ```
/// use rpi_toolkit_core::traits::{MockTime, TimeSource};
///
/// let time = MockTime::new();
/// time.advance(1000);
/// assert_eq!(time.now_us(), 1000);
/// assert_eq!(time.now_ms(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
}

impl MockTime {
    /// Creates a new `MockTime` starting at time 0.
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
        }
    }

    /// Creates a new `MockTime` starting at the specified time.
    pub fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
        }
    }

    /// Sets the current time to an absolute value in microseconds.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by `us` microseconds.
    ///
    /// Wraps at `u64::MAX` so wraparound handling can be exercised.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get().wrapping_add(us));
    }

    /// Advances the current time by `ms` milliseconds.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(ms.wrapping_mul(1000));
    }
}

impl TimeSource for MockTime {
    fn now_ms(&self) -> u64 {
        self.current_us.get() / 1000
    }

    fn now_us(&self) -> u64 {
        self.current_us.get()
    }
}
