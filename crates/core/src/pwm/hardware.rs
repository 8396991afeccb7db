//! Hardware PWM peripheral driver
//!
//! The PWM block generates the waveform itself once configured, so output
//! continues with no polling. Each channel runs in mark/space mode: the pin
//! is high for `DATn` counts out of every `RNGn` counts of the PWM clock.
//!
//! The PWM clock is the oscillator divided by an integer divisor in the
//! clock manager, shared by both channels:
//!
//! ```text
//! period_count = round(base_clock_hz / (divider * frequency_hz))
//! duty_count   = round(duty_cycle * period_count)
//! ```
//!
//! The divider is the smallest that lets the period fit the range register,
//! which maximises duty resolution. When that one rounds the frequency
//! outside the tolerance, the divider with the smallest error is used
//! instead. While one channel is enabled, the other must fit the divider
//! already in use.

use libm::{ceil, fabs, round};

use super::PwmConfig;
use crate::error::{Result, ToolkitError};
use crate::gpio::{Function, Gpio};
use crate::registers::clock::{
    divisor_word, BUSY, BUSY_POLL_LIMIT, CM_PWMCTL, CM_PWMDIV, DIVI_MAX, DIVI_MIN, ENAB,
    PASSWORD, SRC_OSCILLATOR,
};
use crate::registers::pwm::{Control, CHANNEL1_BITS, CHANNEL2_BITS, CTL, DAT1, DAT2, RNG1, RNG2};
use crate::registers::RegisterBank;

/// Largest relative frequency error accepted (1 %)
pub const FREQUENCY_TOLERANCE: f64 = 0.01;

/// Smallest usable range (period) count
pub const RANGE_MIN: u32 = 2;

/// PWM output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmChannel {
    Pwm0,
    Pwm1,
}

impl PwmChannel {
    /// Channel from its index (0 or 1)
    pub fn from_index(index: u32) -> Result<Self> {
        match index {
            0 => Ok(PwmChannel::Pwm0),
            1 => Ok(PwmChannel::Pwm1),
            _ => Err(ToolkitError::InvalidConfiguration {
                reason: "PWM channel must be 0 or 1",
            }),
        }
    }

    pub fn index(self) -> usize {
        match self {
            PwmChannel::Pwm0 => 0,
            PwmChannel::Pwm1 => 1,
        }
    }

    fn other(self) -> Self {
        match self {
            PwmChannel::Pwm0 => PwmChannel::Pwm1,
            PwmChannel::Pwm1 => PwmChannel::Pwm0,
        }
    }

    fn range_offset(self) -> usize {
        match self {
            PwmChannel::Pwm0 => RNG1,
            PwmChannel::Pwm1 => RNG2,
        }
    }

    fn data_offset(self) -> usize {
        match self {
            PwmChannel::Pwm0 => DAT1,
            PwmChannel::Pwm1 => DAT2,
        }
    }

    fn enable_bit(self) -> Control {
        match self {
            PwmChannel::Pwm0 => Control::PWEN1,
            PwmChannel::Pwm1 => Control::PWEN2,
        }
    }

    fn mark_space_bit(self) -> Control {
        match self {
            PwmChannel::Pwm0 => Control::MSEN1,
            PwmChannel::Pwm1 => Control::MSEN2,
        }
    }

    fn control_bits(self) -> Control {
        match self {
            PwmChannel::Pwm0 => CHANNEL1_BITS,
            PwmChannel::Pwm1 => CHANNEL2_BITS,
        }
    }
}

/// Pins with a PWM alternate function on the 40-pin header
pub const PWM_PINS: [(u8, PwmChannel, Function); 4] = [
    (12, PwmChannel::Pwm0, Function::Alt0),
    (13, PwmChannel::Pwm1, Function::Alt0),
    (18, PwmChannel::Pwm0, Function::Alt5),
    (19, PwmChannel::Pwm1, Function::Alt5),
];

/// Channel and alternate function driving `pin`, if it has one
pub fn channel_for_pin(pin: u8) -> Option<(PwmChannel, Function)> {
    PWM_PINS
        .iter()
        .find(|(p, _, _)| *p == pin)
        .map(|&(_, channel, function)| (channel, function))
}

/// Route `pin` to its PWM channel by selecting the alternate function
///
/// # Errors
///
/// `InvalidPin` if the pin has no PWM function.
pub fn attach_pin<B: RegisterBank>(gpio: &mut Gpio<B>, pin: u8) -> Result<PwmChannel> {
    let (channel, function) =
        channel_for_pin(pin).ok_or(ToolkitError::InvalidPin { pin: pin as u32 })?;
    gpio.set_function(pin, function)?;
    Ok(channel)
}

/// Register values for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmSettings {
    pub clock_divider: u32,
    pub period_count: u32,
    pub duty_count: u32,
}

impl PwmSettings {
    /// Pick the divider and counts for `config`
    ///
    /// The smallest divider that fits the period wins when it is within
    /// [`FREQUENCY_TOLERANCE`]. Otherwise every larger divider is tried and
    /// the one closest to the requested frequency is used.
    pub fn compute(base_clock_hz: u32, config: &PwmConfig) -> Result<Self> {
        config.validate()?;
        let requested = config.frequency_hz as f64;
        let needed = ceil(base_clock_hz as f64 / requested / u32::MAX as f64);
        if needed > DIVI_MAX as f64 {
            return Err(ToolkitError::InvalidConfiguration {
                reason: "frequency below the clock divider range",
            });
        }
        let smallest = (needed as u32).max(DIVI_MIN);

        let mut best: Option<(u32, f64)> = None;
        for divider in smallest..=DIVI_MAX {
            let period = period_for(base_clock_hz, divider, requested);
            if period < RANGE_MIN as f64 {
                break;
            }
            let error = relative_error(base_clock_hz, divider, period, requested);
            if best.map_or(true, |(_, best_error)| error < best_error) {
                best = Some((divider, error));
            }
            if divider == smallest && error <= FREQUENCY_TOLERANCE {
                break;
            }
        }

        match best {
            Some((divider, error)) if error <= FREQUENCY_TOLERANCE => {
                Self::with_divider(base_clock_hz, divider, config)
            }
            // reports why the smallest divider is unusable
            _ => Self::with_divider(base_clock_hz, smallest, config),
        }
    }

    /// Counts for `config` with a fixed divider
    pub fn with_divider(base_clock_hz: u32, divider: u32, config: &PwmConfig) -> Result<Self> {
        config.validate()?;
        if !(DIVI_MIN..=DIVI_MAX).contains(&divider) {
            return Err(ToolkitError::InvalidConfiguration {
                reason: "clock divider out of range",
            });
        }
        let requested = config.frequency_hz as f64;
        let period = period_for(base_clock_hz, divider, requested);
        if period > u32::MAX as f64 {
            return Err(ToolkitError::InvalidConfiguration {
                reason: "frequency too low for the current clock divider",
            });
        }
        if period < RANGE_MIN as f64 {
            return Err(ToolkitError::InvalidConfiguration {
                reason: "frequency too high for the PWM clock",
            });
        }
        let period_count = period as u32;
        if relative_error(base_clock_hz, divider, period, requested) > FREQUENCY_TOLERANCE {
            return Err(ToolkitError::InvalidConfiguration {
                reason: "frequency not representable within tolerance",
            });
        }
        Ok(Self {
            clock_divider: divider,
            period_count,
            duty_count: duty_count(config.duty_cycle, period_count),
        })
    }

    /// Frequency these settings produce
    pub fn frequency_hz(&self, base_clock_hz: u32) -> f64 {
        base_clock_hz as f64 / (self.clock_divider as f64 * self.period_count as f64)
    }

    /// Duty cycle these settings produce
    pub fn duty_cycle(&self) -> f64 {
        self.duty_count as f64 / self.period_count as f64
    }
}

fn period_for(base_clock_hz: u32, divider: u32, frequency_hz: f64) -> f64 {
    round(base_clock_hz as f64 / (divider as f64 * frequency_hz))
}

fn relative_error(base_clock_hz: u32, divider: u32, period: f64, requested: f64) -> f64 {
    let actual = base_clock_hz as f64 / (divider as f64 * period);
    fabs(actual - requested) / requested
}

fn duty_count(duty_cycle: f32, period_count: u32) -> u32 {
    let count = round(duty_cycle as f64 * period_count as f64) as u32;
    count.min(period_count)
}

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    config: PwmConfig,
    settings: PwmSettings,
}

/// Driver for the PWM block and its clock
///
/// Owns the two register banks; [`release`](Self::release) stops output and
/// hands them back.
#[derive(Debug)]
pub struct HwPwm<P: RegisterBank, C: RegisterBank> {
    pwm: P,
    clock: C,
    base_clock_hz: u32,
    divider: Option<u32>,
    channels: [Option<ChannelState>; 2],
}

impl<P: RegisterBank, C: RegisterBank> HwPwm<P, C> {
    /// Take over the PWM and clock manager banks
    ///
    /// Both channels start disabled and unconfigured.
    pub fn new(mut pwm: P, clock: C, base_clock_hz: u32) -> Self {
        let all = CHANNEL1_BITS.union(CHANNEL2_BITS).bits();
        pwm.modify(CTL, all, 0);
        Self {
            pwm,
            clock,
            base_clock_hz,
            divider: None,
            channels: [None, None],
        }
    }

    /// Program frequency and duty cycle for `channel`
    ///
    /// Leaves the channel's enable state unchanged. If the clock divider has
    /// to change, a disabled other channel is re-derived for the new divider
    /// (or left unconfigured if it no longer fits).
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when the request is out of range, exceeds
    /// [`FREQUENCY_TOLERANCE`], or conflicts with the divider an enabled
    /// other channel is using. `HardwareAccess` if the clock will not stop,
    /// in which case the clock is left stopped and [`divider`](Self::divider)
    /// reads `None` until a later call reprograms it.
    pub fn set_frequency_duty(
        &mut self,
        channel: PwmChannel,
        config: PwmConfig,
    ) -> Result<PwmSettings> {
        let other = channel.other();
        let settings = match self.divider {
            Some(divider) if self.is_enabled(other) => {
                PwmSettings::with_divider(self.base_clock_hz, divider, &config)?
            }
            _ => PwmSettings::compute(self.base_clock_hz, &config)?,
        };

        if self.divider != Some(settings.clock_divider) {
            // cleared until the clock is running again at the new divisor
            self.divider = None;
            self.program_clock(settings.clock_divider)?;
            self.divider = Some(settings.clock_divider);
            self.rederive(other);
        }

        self.write_counts(channel, &settings);
        self.channels[channel.index()] = Some(ChannelState { config, settings });
        Ok(settings)
    }

    /// Change only the duty cycle of a configured channel
    pub fn set_duty(&mut self, channel: PwmChannel, duty_cycle: f32) -> Result<PwmSettings> {
        super::validate_duty(duty_cycle)?;
        let state = self.channels[channel.index()]
            .as_mut()
            .ok_or(ToolkitError::InvalidConfiguration {
                reason: "PWM channel has no frequency configured",
            })?;
        state.config.duty_cycle = duty_cycle;
        state.settings.duty_count = duty_count(duty_cycle, state.settings.period_count);
        let settings = state.settings;
        self.pwm.write(channel.data_offset(), settings.duty_count);
        Ok(settings)
    }

    /// Start output on a configured channel
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if the channel has no frequency or the PWM
    /// clock is not running.
    pub fn enable(&mut self, channel: PwmChannel) -> Result<()> {
        if self.channels[channel.index()].is_none() {
            return Err(ToolkitError::InvalidConfiguration {
                reason: "PWM channel has no frequency configured",
            });
        }
        if self.divider.is_none() {
            return Err(ToolkitError::InvalidConfiguration {
                reason: "PWM clock is not running",
            });
        }
        let bits = channel.enable_bit().union(channel.mark_space_bit());
        self.pwm
            .modify(CTL, channel.control_bits().bits(), bits.bits());
        Ok(())
    }

    /// Stop output on a channel; its configuration is kept
    pub fn disable(&mut self, channel: PwmChannel) {
        self.pwm.modify(CTL, channel.enable_bit().bits(), 0);
    }

    pub fn is_enabled(&self, channel: PwmChannel) -> bool {
        Control::from_bits_truncate(self.pwm.read(CTL)).contains(channel.enable_bit())
    }

    /// Register values currently programmed for `channel`
    pub fn settings(&self, channel: PwmChannel) -> Option<PwmSettings> {
        self.channels[channel.index()].map(|state| state.settings)
    }

    /// Divider the PWM clock is running at, once programmed
    pub fn divider(&self) -> Option<u32> {
        self.divider
    }

    pub fn base_clock_hz(&self) -> u32 {
        self.base_clock_hz
    }

    /// PWM and clock manager banks, for inspection
    pub fn banks(&self) -> (&P, &C) {
        (&self.pwm, &self.clock)
    }

    /// Disable both channels, stop the clock and return the banks
    pub fn release(mut self) -> (P, C) {
        self.disable(PwmChannel::Pwm0);
        self.disable(PwmChannel::Pwm1);
        self.clock.write(CM_PWMCTL, PASSWORD | SRC_OSCILLATOR);
        (self.pwm, self.clock)
    }

    fn write_counts(&mut self, channel: PwmChannel, settings: &PwmSettings) {
        self.pwm.write(channel.range_offset(), settings.period_count);
        self.pwm.write(channel.data_offset(), settings.duty_count);
    }

    fn rederive(&mut self, channel: PwmChannel) {
        let (Some(divider), Some(state)) = (self.divider, self.channels[channel.index()]) else {
            return;
        };
        match PwmSettings::with_divider(self.base_clock_hz, divider, &state.config) {
            Ok(settings) => {
                self.write_counts(channel, &settings);
                self.channels[channel.index()] = Some(ChannelState {
                    config: state.config,
                    settings,
                });
            }
            Err(_) => self.channels[channel.index()] = None,
        }
    }

    /// Stop the PWM clock, wait for it to go idle, set the divisor, restart
    fn program_clock(&mut self, divider: u32) -> Result<()> {
        self.clock.write(CM_PWMCTL, PASSWORD | SRC_OSCILLATOR);
        let mut polls = 0;
        while self.clock.read(CM_PWMCTL) & BUSY != 0 {
            polls += 1;
            if polls >= BUSY_POLL_LIMIT {
                return Err(ToolkitError::HardwareAccess {
                    context: "PWM clock stayed busy after stop",
                });
            }
        }
        self.clock.write(CM_PWMDIV, divisor_word(divider));
        self.clock.write(CM_PWMCTL, PASSWORD | SRC_OSCILLATOR);
        self.clock.write(CM_PWMCTL, PASSWORD | SRC_OSCILLATOR | ENAB);
        Ok(())
    }
}
