//! Software-simulated register banks for host testing
//!
//! `SimulatedBank` is plain memory with a log of recent writes, enough to
//! stand in for the PWM and clock manager blocks. `SimulatedGpio` adds the
//! GPIO block's side effects: writes to the set/clear registers change the
//! level registers, and reads of the write-only registers return 0.

use heapless::Deque;

use super::gpio::{bank_bit, GPCLR0, GPIO_BLOCK_SIZE, GPLEV0, GPSET0, PIN_COUNT};
use super::RegisterBank;

/// Number of recent writes kept for inspection
pub const WRITE_LOG_DEPTH: usize = 64;

/// A recorded register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite {
    pub offset: usize,
    pub value: u32,
}

/// Plain simulated register memory of `WORDS` 32-bit words
#[derive(Debug, Clone)]
pub struct SimulatedBank<const WORDS: usize> {
    words: [u32; WORDS],
    writes: Deque<RegisterWrite, WRITE_LOG_DEPTH>,
}

impl<const WORDS: usize> SimulatedBank<WORDS> {
    /// All registers zero, empty write log
    pub fn new() -> Self {
        Self {
            words: [0; WORDS],
            writes: Deque::new(),
        }
    }

    /// Set a register without recording a write (simulates hardware updating
    /// a status register on its own)
    pub fn poke(&mut self, offset: usize, value: u32) {
        self.words[Self::index(offset)] = value;
    }

    /// Writes recorded since the last [`clear_writes`](Self::clear_writes),
    /// oldest first, at most [`WRITE_LOG_DEPTH`]
    pub fn writes(&self) -> impl Iterator<Item = &RegisterWrite> {
        self.writes.iter()
    }

    /// Writes recorded to a single register
    pub fn writes_to(&self, offset: usize) -> impl Iterator<Item = u32> + '_ {
        self.writes
            .iter()
            .filter(move |w| w.offset == offset)
            .map(|w| w.value)
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    fn index(offset: usize) -> usize {
        assert!(offset % 4 == 0, "unaligned register offset {:#x}", offset);
        let index = offset / 4;
        assert!(index < WORDS, "register offset {:#x} outside bank", offset);
        index
    }

    fn record(&mut self, offset: usize, value: u32) {
        if self.writes.is_full() {
            self.writes.pop_front();
        }
        // Cannot fail: a slot was freed above when full
        let _ = self.writes.push_back(RegisterWrite { offset, value });
    }
}

impl<const WORDS: usize> Default for SimulatedBank<WORDS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const WORDS: usize> RegisterBank for SimulatedBank<WORDS> {
    fn read(&self, offset: usize) -> u32 {
        self.words[Self::index(offset)]
    }

    fn write(&mut self, offset: usize, value: u32) {
        self.record(offset, value);
        self.words[Self::index(offset)] = value;
    }

    fn size(&self) -> usize {
        WORDS * 4
    }
}

const GPIO_WORDS: usize = GPIO_BLOCK_SIZE / 4;

/// Simulated GPIO block with set/clear/level behaviour
#[derive(Debug, Clone, Default)]
pub struct SimulatedGpio {
    bank: SimulatedBank<GPIO_WORDS>,
}

impl SimulatedGpio {
    pub fn new() -> Self {
        Self {
            bank: SimulatedBank::new(),
        }
    }

    /// Drive an input externally (simulates a signal on the pin)
    pub fn inject_level(&mut self, pin: u8, high: bool) {
        assert!(pin < PIN_COUNT, "pin {} outside the GPIO bank", pin);
        let bit = bank_bit(pin);
        let offset = bit.level_offset();
        let level = self.bank.read(offset);
        let level = if high { level | bit.mask } else { level & !bit.mask };
        self.bank.poke(offset, level);
    }

    /// Underlying memory, for inspecting raw words and the write log
    pub fn bank(&self) -> &SimulatedBank<GPIO_WORDS> {
        &self.bank
    }

    pub fn clear_writes(&mut self) {
        self.bank.clear_writes();
    }

    fn pair_index(offset: usize, base: usize) -> Option<usize> {
        match offset.checked_sub(base) {
            Some(0) => Some(0),
            Some(4) => Some(1),
            _ => None,
        }
    }
}

impl RegisterBank for SimulatedGpio {
    fn read(&self, offset: usize) -> u32 {
        if Self::pair_index(offset, GPSET0).is_some() || Self::pair_index(offset, GPCLR0).is_some()
        {
            return 0;
        }
        self.bank.read(offset)
    }

    fn write(&mut self, offset: usize, value: u32) {
        if let Some(word) = Self::pair_index(offset, GPSET0) {
            self.bank.record(offset, value);
            let level_offset = GPLEV0 + word * 4;
            let level = self.bank.read(level_offset);
            self.bank.poke(level_offset, level | value);
        } else if let Some(word) = Self::pair_index(offset, GPCLR0) {
            self.bank.record(offset, value);
            let level_offset = GPLEV0 + word * 4;
            let level = self.bank.read(level_offset);
            self.bank.poke(level_offset, level & !value);
        } else if Self::pair_index(offset, GPLEV0).is_some() {
            // read-only on hardware; record so tests can catch the attempt
            self.bank.record(offset, value);
        } else {
            self.bank.write(offset, value);
        }
    }

    fn size(&self) -> usize {
        GPIO_BLOCK_SIZE
    }
}
