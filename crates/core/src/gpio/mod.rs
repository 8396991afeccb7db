//! GPIO register driver
//!
//! [`Gpio`] is a stateless accessor over a GPIO register bank: the pin
//! configuration and levels live in the registers, the driver owns only the
//! bank handle. Every access touches only the target pin's bits.
//!
//! # Register discipline
//!
//! - Function select is a read-modify-write of the pin's 3-bit field. This
//!   driver is single-threaded per process, so the sequence is atomic from
//!   the caller's point of view.
//! - Output levels are written through the write-only set/clear registers,
//!   one bit per write. The level register is never written, so pins sharing
//!   a word cannot be clobbered.
//!
//! # Example
//!
//! ```
//! use rpi_toolkit_core::gpio::{Gpio, Level, PinMode};
//! use rpi_toolkit_core::registers::SimulatedGpio;
//!
//! let mut gpio = Gpio::new(SimulatedGpio::new());
//! gpio.pin_mode(21, PinMode::Output)?;
//! gpio.digital_write(21, Level::High)?;
//! assert_eq!(gpio.digital_read(21)?, Level::High);
//! # Ok::<(), rpi_toolkit_core::ToolkitError>(())
//! ```

use crate::error::{Result, ToolkitError};
use crate::registers::gpio::{bank_bit, fsel_field, FSEL_MASK, PIN_COUNT};
use crate::registers::RegisterBank;

/// Direction a pin can be configured for with [`Gpio::pin_mode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

/// Digital logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl core::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// 3-bit function select value
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Input = 0b000,
    Output = 0b001,
    Alt0 = 0b100,
    Alt1 = 0b101,
    Alt2 = 0b110,
    Alt3 = 0b111,
    Alt4 = 0b011,
    Alt5 = 0b010,
}

impl Function {
    fn from_bits(bits: u32) -> Function {
        match bits & FSEL_MASK {
            0b000 => Function::Input,
            0b001 => Function::Output,
            0b100 => Function::Alt0,
            0b101 => Function::Alt1,
            0b110 => Function::Alt2,
            0b111 => Function::Alt3,
            0b011 => Function::Alt4,
            _ => Function::Alt5,
        }
    }
}

impl From<PinMode> for Function {
    fn from(mode: PinMode) -> Self {
        match mode {
            PinMode::Input => Function::Input,
            PinMode::Output => Function::Output,
        }
    }
}

/// Check a pin index against the bank size
pub fn validate_pin(pin: u32) -> Result<u8> {
    if pin < PIN_COUNT as u32 {
        Ok(pin as u8)
    } else {
        Err(ToolkitError::InvalidPin { pin })
    }
}

/// GPIO driver over a register bank
#[derive(Debug)]
pub struct Gpio<B: RegisterBank> {
    bank: B,
}

impl<B: RegisterBank> Gpio<B> {
    /// Wrap an already mapped (or simulated) GPIO block
    pub fn new(bank: B) -> Self {
        Self { bank }
    }

    /// Configure `pin` as input or output
    ///
    /// # Errors
    ///
    /// `InvalidPin` if `pin` is outside the bank; nothing is written.
    pub fn pin_mode(&mut self, pin: u8, mode: PinMode) -> Result<()> {
        self.set_function(pin, mode.into())
    }

    /// Select any function, including the alternate functions peripherals use
    pub fn set_function(&mut self, pin: u8, function: Function) -> Result<()> {
        let pin = validate_pin(pin as u32)?;
        let field = fsel_field(pin);
        self.bank
            .modify(field.offset, field.mask(), (function as u32) << field.shift);
        Ok(())
    }

    /// Currently selected function of `pin`
    pub fn function(&self, pin: u8) -> Result<Function> {
        let pin = validate_pin(pin as u32)?;
        let field = fsel_field(pin);
        Ok(Function::from_bits(self.bank.read(field.offset) >> field.shift))
    }

    /// Drive an output pin
    ///
    /// # Errors
    ///
    /// `InvalidPin` for an out-of-range pin, `InvalidPinState` when the pin is
    /// not configured as an output.
    pub fn digital_write(&mut self, pin: u8, level: Level) -> Result<()> {
        let function = self.function(pin)?;
        if function != Function::Output {
            return Err(ToolkitError::InvalidPinState { pin, function });
        }
        let bit = bank_bit(pin);
        match level {
            Level::High => self.bank.write(bit.set_offset(), bit.mask),
            Level::Low => self.bank.write(bit.clear_offset(), bit.mask),
        }
        Ok(())
    }

    /// Read the pin's level; valid in any mode (outputs read back their
    /// driven value)
    pub fn digital_read(&self, pin: u8) -> Result<Level> {
        let pin = validate_pin(pin as u32)?;
        let bit = bank_bit(pin);
        Ok(Level::from(self.bank.read(bit.level_offset()) & bit.mask != 0))
    }

    /// Invert an output pin, returning the new level
    pub fn toggle(&mut self, pin: u8) -> Result<Level> {
        let level = !self.digital_read(pin)?;
        self.digital_write(pin, level)?;
        Ok(level)
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Give the bank back, ending this driver's use of it
    pub fn release(self) -> B {
        self.bank
    }
}
