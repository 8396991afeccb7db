//! rpi_toolkit_core - register-level GPIO/PWM drivers and non-blocking timers
//!
//! Everything here runs against the [`registers::RegisterBank`] and
//! [`traits::TimeSource`] abstractions, so it can be tested on the host with
//! simulated registers and a mock clock. The `rpi_toolkit` crate supplies the
//! memory-mapped banks and the monotonic clock on the board.
//!
//! # Design Principles
//!
//! - **Zero cfg**: no feature-gated code
//! - **no_std**: no allocation, no OS
//! - **Non-blocking**: nothing sleeps; callers poll at the resolution they need
//!
//! # Modules
//!
//! - [`traits`]: monotonic clock abstraction and mock clock
//! - [`timer`]: drift-free interval timer
//! - [`registers`]: register bank trait, peripheral layouts, simulated banks
//! - [`gpio`]: pin mode and digital read/write
//! - [`pwm`]: software and hardware PWM
//! - [`error`]: driver error type

#![cfg_attr(not(test), no_std)]

pub mod error;
pub mod gpio;
pub mod pwm;
pub mod registers;
pub mod timer;
pub mod traits;

pub use error::{Result, ToolkitError};
pub use gpio::{Function, Gpio, Level, PinMode};
pub use pwm::{HwPwm, PwmChannel, PwmConfig, PwmSettings, SoftPwm};
pub use timer::Timer;
pub use traits::{MockTime, TimeSource};
