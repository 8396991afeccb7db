//! Typed register-bank abstraction
//!
//! Drivers never touch raw addresses. They read and write 32-bit words of a
//! [`RegisterBank`] at named byte offsets from the layout modules below. The
//! board backs a bank with an `mmap`ed peripheral window; tests back it with
//! [`SimulatedBank`] or [`SimulatedGpio`].
//!
//! Offsets follow the BCM2835 ARM Peripherals datasheet, which also holds for
//! BCM2836/7 and for the legacy blocks of BCM2711.

pub mod clock;
pub mod gpio;
pub mod pwm;
pub mod sim;

pub use sim::{SimulatedBank, SimulatedGpio};

/// A block of 32-bit memory-mapped registers
///
/// # Safety Invariants
///
/// - `offset` is a byte offset from the start of the block and is 4-aligned
/// - Implementations access exactly one word per call (no tearing, no
///   widening to neighbouring registers)
/// - Offsets outside the block are a caller bug; implementations must not
///   access memory outside the block for them
pub trait RegisterBank {
    /// Read the word at byte `offset`
    fn read(&self, offset: usize) -> u32;

    /// Write the word at byte `offset`
    fn write(&mut self, offset: usize, value: u32);

    /// Size of the block in bytes
    fn size(&self) -> usize;

    /// Replace the bits selected by `mask` with the same bits of `value`.
    ///
    /// Read-modify-write; only use on configuration registers, never on
    /// registers another pin's state shares a word with at runtime.
    fn modify(&mut self, offset: usize, mask: u32, value: u32) {
        let current = self.read(offset);
        self.write(offset, (current & !mask) | (value & mask));
    }
}

impl<B: RegisterBank + ?Sized> RegisterBank for &mut B {
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    fn write(&mut self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }

    fn size(&self) -> usize {
        (**self).size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modify_touches_only_masked_bits() {
        let mut bank = SimulatedBank::<4>::new();
        bank.write(0x4, 0xFFFF_0000);
        bank.modify(0x4, 0x0000_00F0, 0xFFFF_FFA5);
        assert_eq!(bank.read(0x4), 0xFFFF_00A0);
    }

    #[test]
    fn mutable_reference_is_a_bank() {
        let mut bank = SimulatedBank::<2>::new();
        {
            let mut by_ref = &mut bank;
            by_ref.write(0x0, 7);
            assert_eq!(by_ref.size(), 8);
        }
        assert_eq!(bank.read(0x0), 7);
    }
}
