//! GPIO register layout
//!
//! Function select uses 3 bits per pin, ten pins per word. Set, clear and
//! level registers use one bit per pin, 32 pins per word.

/// Offset of the GPIO block from the peripheral base
pub const GPIO_BLOCK_OFFSET: u64 = 0x0020_0000;

/// Bytes mapped for the GPIO block (one page covers every register)
pub const GPIO_BLOCK_SIZE: usize = 4096;

/// Number of GPIO lines on the bank
pub const PIN_COUNT: u8 = 54;

/// Function select registers (GPIO 0-9, 10-19, ... 50-53)
pub const GPFSEL0: usize = 0x00;

/// Pin output set registers (GPIO 0-31, 32-53), write-only
pub const GPSET0: usize = 0x1C;

/// Pin output clear registers (GPIO 0-31, 32-53), write-only
pub const GPCLR0: usize = 0x28;

/// Pin level registers (GPIO 0-31, 32-53), read-only
pub const GPLEV0: usize = 0x34;

pub const PINS_PER_FSEL_WORD: u8 = 10;
pub const FSEL_BITS: u32 = 3;
pub const FSEL_MASK: u32 = 0b111;
pub const PINS_PER_BANK_WORD: u8 = 32;

/// Location of a pin's function select field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FselField {
    /// Byte offset of the GPFSELn register
    pub offset: usize,
    /// Bit position of the field's least significant bit
    pub shift: u32,
}

impl FselField {
    /// Mask selecting this pin's three bits
    pub const fn mask(&self) -> u32 {
        FSEL_MASK << self.shift
    }
}

/// Location of a pin's bit in the 32-pin set/clear/level register pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankBit {
    /// Index of the register within its pair (0 or 1)
    pub word: usize,
    /// Single-bit mask
    pub mask: u32,
}

impl BankBit {
    pub const fn set_offset(&self) -> usize {
        GPSET0 + self.word * 4
    }

    pub const fn clear_offset(&self) -> usize {
        GPCLR0 + self.word * 4
    }

    pub const fn level_offset(&self) -> usize {
        GPLEV0 + self.word * 4
    }
}

/// Function select field for `pin`. Caller validates the pin range.
pub const fn fsel_field(pin: u8) -> FselField {
    FselField {
        offset: GPFSEL0 + (pin / PINS_PER_FSEL_WORD) as usize * 4,
        shift: (pin % PINS_PER_FSEL_WORD) as u32 * FSEL_BITS,
    }
}

/// Set/clear/level bit for `pin`. Caller validates the pin range.
pub const fn bank_bit(pin: u8) -> BankBit {
    BankBit {
        word: (pin / PINS_PER_BANK_WORD) as usize,
        mask: 1 << (pin % PINS_PER_BANK_WORD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fsel_field_locations() {
        assert_eq!(fsel_field(0), FselField { offset: 0x00, shift: 0 });
        assert_eq!(fsel_field(9), FselField { offset: 0x00, shift: 27 });
        assert_eq!(fsel_field(10), FselField { offset: 0x04, shift: 0 });
        assert_eq!(fsel_field(21), FselField { offset: 0x08, shift: 3 });
        assert_eq!(fsel_field(53), FselField { offset: 0x14, shift: 9 });
        assert_eq!(fsel_field(18).mask(), 0b111 << 24);
    }

    #[test]
    fn bank_bit_locations() {
        let b = bank_bit(21);
        assert_eq!(b.word, 0);
        assert_eq!(b.mask, 1 << 21);
        assert_eq!(b.set_offset(), 0x1C);

        let b = bank_bit(32);
        assert_eq!(b.word, 1);
        assert_eq!(b.mask, 1);
        assert_eq!(b.set_offset(), 0x20);
        assert_eq!(b.clear_offset(), 0x2C);
        assert_eq!(b.level_offset(), 0x38);

        assert_eq!(bank_bit(53).mask, 1 << 21);
    }
}
