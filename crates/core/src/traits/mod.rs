//! Core traits for platform-agnostic drivers.
//!
//! Trait definitions are pure and have no feature gates. Mock implementations
//! are always available for host testing; the Linux clock lives in the
//! `rpi_toolkit` crate.

pub mod time;

pub use time::{MockTime, TimeSource};
