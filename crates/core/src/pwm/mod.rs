//! PWM generation
//!
//! Two generators share one configuration type:
//!
//! - [`software::SoftPwm`] toggles any GPIO from the caller's polling loop
//! - [`hardware::HwPwm`] programs the SoC's PWM peripheral, after which the
//!   waveform runs without polling

pub mod hardware;
pub mod software;

pub use hardware::{attach_pin, channel_for_pin, HwPwm, PwmChannel, PwmSettings};
pub use software::SoftPwm;

use crate::error::{Result, ToolkitError};

/// PWM configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PwmConfig {
    /// PWM frequency in Hz
    pub frequency_hz: f32,
    /// Duty cycle (0.0 = always low, 1.0 = always high)
    pub duty_cycle: f32,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 1000.0,
            duty_cycle: 0.0,
        }
    }
}

impl PwmConfig {
    pub fn new(frequency_hz: f32, duty_cycle: f32) -> Self {
        Self {
            frequency_hz,
            duty_cycle,
        }
    }

    /// Reject non-finite or non-positive frequencies and duty cycles outside
    /// [0.0, 1.0]
    pub fn validate(&self) -> Result<()> {
        if !self.frequency_hz.is_finite() || self.frequency_hz <= 0.0 {
            return Err(ToolkitError::InvalidConfiguration {
                reason: "frequency must be a positive number",
            });
        }
        validate_duty(self.duty_cycle)
    }
}

pub(crate) fn validate_duty(duty_cycle: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&duty_cycle) {
        return Err(ToolkitError::InvalidConfiguration {
            reason: "duty cycle must be within 0.0..=1.0",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_bounds() {
        assert!(PwmConfig::new(50.0, 0.0).validate().is_ok());
        assert!(PwmConfig::new(50.0, 1.0).validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(PwmConfig::new(0.0, 0.5).validate().is_err());
        assert!(PwmConfig::new(-10.0, 0.5).validate().is_err());
        assert!(PwmConfig::new(f32::NAN, 0.5).validate().is_err());
        assert!(PwmConfig::new(f32::INFINITY, 0.5).validate().is_err());
        assert!(PwmConfig::new(50.0, 1.1).validate().is_err());
        assert!(PwmConfig::new(50.0, -0.1).validate().is_err());
        assert!(PwmConfig::new(50.0, f32::NAN).validate().is_err());
    }
}
