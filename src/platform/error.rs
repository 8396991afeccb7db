//! Platform error types
//!
//! Wraps the register drivers' [`ToolkitError`] and adds what only the OS
//! layer can fail at: opening and mapping the peripheral windows, and the
//! init/cleanup lifecycle.

use rpi_toolkit_core::ToolkitError;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Errors raised by the Linux platform layer
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// Device could not be opened or mapped
    #[error("hardware access failed: {context}")]
    HardwareAccess {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Pin number outside the `u32` range the drivers take, kept as passed
    #[error("invalid GPIO pin {pin}")]
    InvalidPin { pin: i64 },

    /// Driver used before init or after cleanup
    #[error("driver not initialized")]
    NotInitialized,

    /// Driver initialised twice without cleanup in between
    #[error("driver already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    Driver(#[from] ToolkitError),
}

impl PlatformError {
    pub(crate) fn hardware(context: impl Into<String>, source: std::io::Error) -> Self {
        PlatformError::HardwareAccess {
            context: context.into(),
            source,
        }
    }

    /// Integer code returned through the C ABI
    pub fn code(&self) -> i32 {
        match self {
            PlatformError::HardwareAccess { .. } => -1,
            PlatformError::NotInitialized => -2,
            PlatformError::InvalidPin { .. } => -3,
            PlatformError::AlreadyInitialized => -6,
            PlatformError::Driver(err) => err.code(),
        }
    }
}
