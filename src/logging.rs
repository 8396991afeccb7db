//! Logging macros
//!
//! Thin layer over the `log` facade so the crate logs under one target and
//! the backend stays a decision of the host application. Unit tests print
//! to stdout instead, since no logger is installed there.
//!
//! # Usage
//!
//! ```ignore
//! use crate::log_info;
//!
//! log_info!("mapped {} bytes at {:#x}", len, base);
//! ```

/// Target every message of this crate is logged under
pub const TARGET: &str = "rpi_toolkit";

/// Log info message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(not(test))]
        ::log::info!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(test)]
        println!("[INFO] {}", format!($($arg)*));
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(not(test))]
        ::log::warn!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(test)]
        println!("[WARN] {}", format!($($arg)*));
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(not(test))]
        ::log::error!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(test)]
        println!("[ERROR] {}", format!($($arg)*));
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(not(test))]
        ::log::debug!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(test)]
        println!("[DEBUG] {}", format!($($arg)*));
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(not(test))]
        ::log::trace!(target: $crate::logging::TARGET, $($arg)*);
        #[cfg(test)]
        println!("[TRACE] {}", format!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_accept_format_arguments() {
        let pin = 18;
        crate::log_info!("pin {} ready", pin);
        crate::log_warn!("pin {pin} busy");
        crate::log_error!("failed");
        crate::log_debug!("divider {:#x}", 0x5A00_0000u32);
        crate::log_trace!("tick");
    }
}
