//! PWM peripheral register layout

use bitflags::bitflags;

/// Offset of the PWM block from the peripheral base
pub const PWM_BLOCK_OFFSET: u64 = 0x0020_C000;

pub const PWM_BLOCK_SIZE: usize = 4096;

/// Control register
pub const CTL: usize = 0x00;
/// Status register
pub const STA: usize = 0x04;
/// Channel 1 range (period) register
pub const RNG1: usize = 0x10;
/// Channel 1 data (duty) register
pub const DAT1: usize = 0x14;
/// Channel 2 range (period) register
pub const RNG2: usize = 0x20;
/// Channel 2 data (duty) register
pub const DAT2: usize = 0x24;

bitflags! {
    /// Bits of the PWM control register
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control: u32 {
        /// Channel 1 enable
        const PWEN1 = 1 << 0;
        /// Channel 1 serialiser mode
        const MODE1 = 1 << 1;
        /// Channel 1 repeat last data
        const RPTL1 = 1 << 2;
        /// Channel 1 silence bit
        const SBIT1 = 1 << 3;
        /// Channel 1 polarity
        const POLA1 = 1 << 4;
        /// Channel 1 use FIFO
        const USEF1 = 1 << 5;
        /// Clear FIFO
        const CLRF1 = 1 << 6;
        /// Channel 1 mark/space mode
        const MSEN1 = 1 << 7;
        /// Channel 2 enable
        const PWEN2 = 1 << 8;
        /// Channel 2 serialiser mode
        const MODE2 = 1 << 9;
        /// Channel 2 repeat last data
        const RPTL2 = 1 << 10;
        /// Channel 2 silence bit
        const SBIT2 = 1 << 11;
        /// Channel 2 polarity
        const POLA2 = 1 << 12;
        /// Channel 2 use FIFO
        const USEF2 = 1 << 13;
        /// Channel 2 mark/space mode
        const MSEN2 = 1 << 15;
    }
}

/// Every control bit owned by channel 1
pub const CHANNEL1_BITS: Control = Control::PWEN1
    .union(Control::MODE1)
    .union(Control::RPTL1)
    .union(Control::SBIT1)
    .union(Control::POLA1)
    .union(Control::USEF1)
    .union(Control::MSEN1);

/// Every control bit owned by channel 2
pub const CHANNEL2_BITS: Control = Control::PWEN2
    .union(Control::MODE2)
    .union(Control::RPTL2)
    .union(Control::SBIT2)
    .union(Control::POLA2)
    .union(Control::USEF2)
    .union(Control::MSEN2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_bit_groups_are_disjoint() {
        assert!(CHANNEL1_BITS.intersection(CHANNEL2_BITS).is_empty());
        assert_eq!(CHANNEL1_BITS.bits(), 0x00BF);
        assert_eq!(CHANNEL2_BITS.bits(), 0xBF00);
    }
}
