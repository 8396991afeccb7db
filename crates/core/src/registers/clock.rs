//! Clock manager layout for the PWM clock

/// Offset of the clock manager block from the peripheral base
pub const CLOCK_BLOCK_OFFSET: u64 = 0x0010_1000;

pub const CLOCK_BLOCK_SIZE: usize = 4096;

/// PWM clock control
pub const CM_PWMCTL: usize = 0xA0;
/// PWM clock divisor
pub const CM_PWMDIV: usize = 0xA4;

/// Required in the top byte of every clock manager write
pub const PASSWORD: u32 = 0x5A << 24;

/// Clock source field: oscillator
pub const SRC_OSCILLATOR: u32 = 1;
/// Clock generator enable
pub const ENAB: u32 = 1 << 4;
/// Kill the generator immediately
pub const KILL: u32 = 1 << 5;
/// Generator is running (read-only)
pub const BUSY: u32 = 1 << 7;

/// Integer divisor field position
pub const DIVI_SHIFT: u32 = 12;

/// Smallest integer divisor usable without MASH noise shaping
pub const DIVI_MIN: u32 = 2;
/// Largest integer divisor (12-bit field)
pub const DIVI_MAX: u32 = 0xFFF;

/// Reads of `CM_PWMCTL` before a clock that stays busy is reported
pub const BUSY_POLL_LIMIT: u32 = 10_000;

/// Oscillator frequency on BCM2835/6/7
pub const OSCILLATOR_HZ: u32 = 19_200_000;
/// Oscillator frequency on BCM2711
pub const OSCILLATOR_HZ_BCM2711: u32 = 54_000_000;

/// Encode a divisor register write
pub const fn divisor_word(divider: u32) -> u32 {
    PASSWORD | ((divider & DIVI_MAX) << DIVI_SHIFT)
}
