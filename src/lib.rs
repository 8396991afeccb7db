//! rpi_toolkit - GPIO, PWM and non-blocking timers for the Raspberry Pi
//!
//! The register drivers live in `rpi_toolkit_core` and run on any host
//! against simulated banks. This crate maps the real peripheral blocks on
//! Linux, supplies the monotonic clock and exports the C ABI used from C
//! and Python (`librpi_toolkit.so`).
//!
//! # Example
//!
//! ```no_run
//! use rpi_toolkit::config::BoardConfig;
//! use rpi_toolkit::platform::{self, MonotonicClock};
//! use rpi_toolkit::{Level, PinMode, Timer};
//!
//! let mut gpio = platform::gpio::init(&BoardConfig::from_env())?;
//! gpio.pin_mode(21, PinMode::Output)?;
//!
//! let clock = MonotonicClock::new();
//! let mut blink = Timer::new();
//! blink.set(&clock, 500);
//! let mut level = Level::Low;
//! for _ in 0..10 {
//!     while !blink.tick(&clock) {}
//!     level = !level;
//!     gpio.digital_write(21, level)?;
//! }
//! platform::gpio::cleanup(gpio);
//! # Ok::<(), rpi_toolkit::PlatformError>(())
//! ```

pub mod logging;

pub mod config;
pub mod ffi;
pub mod platform;

pub use config::BoardConfig;
pub use platform::{PlatformError, Result};
pub use rpi_toolkit_core::{
    Function, Gpio, HwPwm, Level, MockTime, PinMode, PwmChannel, PwmConfig, PwmSettings, SoftPwm,
    TimeSource, Timer, ToolkitError,
};
