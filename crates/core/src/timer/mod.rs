//! Non-blocking interval timer
//!
//! A `Timer` is a plain value: an interval and the absolute instant it next
//! expires. It never sleeps; the caller's loop advances it by polling
//! [`Timer::tick`] or checking [`Timer::expired`].
//!
//! # Drift
//!
//! A successful tick re-arms relative to the deadline that was reached, not
//! to the instant it was observed, so poll latency does not accumulate:
//!
//! ```
//! use rpi_toolkit_core::timer::Timer;
//!
//! let mut t = Timer::new();
//! t.set_at(0, 100);
//! assert!(t.tick_at(250)); // caller stalled past two deadlines
//! assert_eq!(t.next_expiry(), 200); // one step, not 250 + 100
//! ```
//!
//! # Catch-up
//!
//! Each tick advances by exactly one interval and reports at most one firing.
//! A caller that stalled for several intervals gets the missed firings one
//! per poll, not as a burst inside a single call.

use crate::traits::TimeSource;

/// Longest usable interval; keeps the signed deadline comparison valid
pub const MAX_INTERVAL_MS: u64 = i64::MAX as u64;

/// Periodic, drift-free, non-blocking timer.
///
/// Layout matches the C `simple_timer_t` (`next_expiry`, then `interval`) so
/// foreign callers can allocate it themselves.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    next_expiry: u64,
    interval: u64,
}

/// True once `now` has reached `deadline` on a wrapping millisecond timeline
#[inline]
pub const fn deadline_reached(now: u64, deadline: u64) -> bool {
    (now.wrapping_sub(deadline) as i64) >= 0
}

impl Timer {
    /// Unarmed timer (interval 0, already expired)
    pub const fn new() -> Self {
        Self {
            next_expiry: 0,
            interval: 0,
        }
    }

    /// Arm for `interval_ms` from the clock's current time
    pub fn set<T: TimeSource>(&mut self, clock: &T, interval_ms: u64) {
        self.set_at(clock.now_ms(), interval_ms);
    }

    /// Arm for `interval_ms` from `now_ms`
    ///
    /// An interval of 0 leaves the timer expired on every poll.
    pub fn set_at(&mut self, now_ms: u64, interval_ms: u64) {
        self.interval = interval_ms.min(MAX_INTERVAL_MS);
        self.next_expiry = now_ms.wrapping_add(self.interval);
    }

    /// Whether the deadline has been reached. Does not mutate.
    pub fn expired<T: TimeSource>(&self, clock: &T) -> bool {
        self.expired_at(clock.now_ms())
    }

    /// [`expired`](Self::expired) against an explicit time
    pub fn expired_at(&self, now_ms: u64) -> bool {
        deadline_reached(now_ms, self.next_expiry)
    }

    /// Fire at most once and re-arm by one interval if due
    pub fn tick<T: TimeSource>(&mut self, clock: &T) -> bool {
        self.tick_at(clock.now_ms())
    }

    /// [`tick`](Self::tick) against an explicit time
    pub fn tick_at(&mut self, now_ms: u64) -> bool {
        if !self.expired_at(now_ms) {
            return false;
        }
        self.next_expiry = self.next_expiry.wrapping_add(self.interval);
        true
    }

    /// Re-arm for `interval_ms` counted from the current deadline.
    ///
    /// Used to chain phases of differing length (as software PWM does)
    /// without picking up the latency of the poll that noticed the deadline.
    pub fn rearm_from_deadline(&mut self, interval_ms: u64) {
        self.interval = interval_ms.min(MAX_INTERVAL_MS);
        self.next_expiry = self.next_expiry.wrapping_add(self.interval);
    }

    /// Milliseconds left before expiry, 0 once due
    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        if self.expired_at(now_ms) {
            0
        } else {
            self.next_expiry.wrapping_sub(now_ms)
        }
    }

    /// Interval in milliseconds, 0 when unset
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Time of the next firing in milliseconds
    pub fn next_expiry(&self) -> u64 {
        self.next_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockTime;

    #[test]
    fn not_expired_until_interval_elapses() {
        let time = MockTime::with_initial(7_000);
        let mut t = Timer::new();
        t.set(&time, 100);

        assert!(!t.expired(&time));
        time.advance_ms(99);
        assert!(!t.expired(&time));
        time.advance_ms(1);
        assert!(t.expired(&time));
        // expired() is a pure predicate
        assert!(t.expired(&time));
        assert_eq!(t.next_expiry(), 7_100);
    }

    #[test]
    fn tick_rearms_from_deadline_not_now() {
        let mut t = Timer::new();
        t.set_at(0, 100);

        assert!(t.tick_at(250));
        assert_eq!(t.next_expiry(), 200);
        // missed firings are handed out one per poll
        assert!(t.tick_at(251));
        assert_eq!(t.next_expiry(), 300);
        assert!(!t.tick_at(252));
        assert_eq!(t.next_expiry(), 300);
    }

    #[test]
    fn tick_false_does_not_mutate() {
        let mut t = Timer::new();
        t.set_at(10, 50);
        let before = t;
        assert!(!t.tick_at(59));
        assert_eq!(t, before);
    }

    #[test]
    fn zero_interval_always_expired() {
        let mut t = Timer::new();
        t.set_at(500, 0);
        assert!(t.expired_at(500));
        for now in 500..510 {
            assert!(t.tick_at(now));
        }
        assert_eq!(t.next_expiry(), 500);
    }

    #[test]
    fn blink_scenario_fires_ten_times() {
        let time = MockTime::new();
        let mut t = Timer::new();
        t.set(&time, 500);

        let mut fired_at = [0u64; 16];
        let mut count = 0;
        for _ in 0..5000 {
            time.advance_ms(1);
            if t.tick(&time) {
                fired_at[count] = time.now_ms();
                count += 1;
            }
        }
        assert_eq!(count, 10);
        for (i, at) in fired_at[..count].iter().enumerate() {
            assert_eq!(*at, (i as u64 + 1) * 500);
        }
    }

    #[test]
    fn deadline_comparison_survives_wraparound() {
        let start = u64::MAX - 30;
        let mut t = Timer::new();
        t.set_at(start, 100);
        assert_eq!(t.next_expiry(), 69);

        assert!(!t.expired_at(u64::MAX));
        assert!(!t.expired_at(68));
        assert_eq!(t.remaining_at(u64::MAX), 70);
        assert!(t.tick_at(69));
        assert_eq!(t.next_expiry(), 169);
    }

    #[test]
    fn explicit_time_matches_clock() {
        let time = MockTime::with_initial(5_000_000);
        let mut by_clock = Timer::new();
        let mut by_value = Timer::new();
        by_clock.set(&time, 25);
        by_value.set_at(time.now_ms(), 25);

        for _ in 0..100 {
            time.advance_ms(1);
            assert_eq!(by_clock.expired(&time), by_value.expired_at(time.now_ms()));
            assert_eq!(by_clock.tick(&time), by_value.tick_at(time.now_ms()));
        }
        assert_eq!(by_clock.next_expiry(), by_value.next_expiry());
        assert_eq!(by_value.next_expiry(), 5_125);
        assert_eq!(by_value.interval(), 25);
    }

    #[test]
    fn remaining_counts_down() {
        let mut t = Timer::new();
        t.set_at(1_000, 40);
        assert_eq!(t.remaining_at(1_000), 40);
        assert_eq!(t.remaining_at(1_030), 10);
        assert_eq!(t.remaining_at(1_040), 0);
        assert_eq!(t.remaining_at(2_000), 0);
    }

    #[test]
    fn oversized_interval_is_clamped() {
        let mut t = Timer::new();
        t.set_at(0, u64::MAX);
        assert_eq!(t.interval(), MAX_INTERVAL_MS);
        assert!(!t.expired_at(1 << 40));
    }

    #[test]
    fn rearm_from_deadline_chains_phases() {
        let mut t = Timer::new();
        t.set_at(0, 3);
        assert!(t.expired_at(4));
        t.rearm_from_deadline(7);
        assert_eq!(t.next_expiry(), 10);
        assert_eq!(t.interval(), 7);
    }
}
