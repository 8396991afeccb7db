//! Driver error types
//!
//! Errors shared by the GPIO, PWM and timer drivers. Platform layers wrap
//! these and add their own access failures.

use core::fmt;

use crate::gpio::Function;

/// Result type for driver operations
pub type Result<T> = core::result::Result<T, ToolkitError>;

/// Errors that can occur while driving the peripheral registers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolkitError {
    /// Peripheral registers could not be accessed or did not respond
    HardwareAccess {
        /// What was being attempted
        context: &'static str,
    },
    /// Operation issued before init or after cleanup
    NotInitialized,
    /// Pin index outside the platform's GPIO range
    InvalidPin {
        /// Offending pin index
        pin: u32,
    },
    /// Operation incompatible with the pin's configured function
    InvalidPinState {
        /// Pin the operation targeted
        pin: u8,
        /// Function the pin is currently configured for
        function: Function,
    },
    /// PWM frequency or duty cycle cannot be represented
    InvalidConfiguration {
        /// Human-readable reason
        reason: &'static str,
    },
}

impl ToolkitError {
    /// Stable integer code used across the C ABI
    ///
    /// Zero means success there, so every variant maps to a negative value.
    pub const fn code(&self) -> i32 {
        match self {
            ToolkitError::HardwareAccess { .. } => -1,
            ToolkitError::NotInitialized => -2,
            ToolkitError::InvalidPin { .. } => -3,
            ToolkitError::InvalidPinState { .. } => -4,
            ToolkitError::InvalidConfiguration { .. } => -5,
        }
    }
}

impl fmt::Display for ToolkitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolkitError::HardwareAccess { context } => {
                write!(f, "hardware access failed: {}", context)
            }
            ToolkitError::NotInitialized => write!(f, "peripheral not initialized"),
            ToolkitError::InvalidPin { pin } => write!(f, "invalid GPIO pin {}", pin),
            ToolkitError::InvalidPinState { pin, function } => {
                write!(f, "GPIO {} is configured as {:?}", pin, function)
            }
            ToolkitError::InvalidConfiguration { reason } => {
                write!(f, "invalid PWM configuration: {}", reason)
            }
        }
    }
}

impl core::error::Error for ToolkitError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_negative_and_distinct() {
        let errors = [
            ToolkitError::HardwareAccess { context: "x" },
            ToolkitError::NotInitialized,
            ToolkitError::InvalidPin { pin: 99 },
            ToolkitError::InvalidPinState {
                pin: 4,
                function: Function::Input,
            },
            ToolkitError::InvalidConfiguration { reason: "x" },
        ];
        for (i, a) in errors.iter().enumerate() {
            assert!(a.code() < 0);
            for b in &errors[i + 1..] {
                assert_ne!(a.code(), b.code());
            }
        }
    }
}
