//! Software PWM on any GPIO
//!
//! Approximates a waveform by toggling a pin from the caller's polling loop.
//! The pin spends `on_ms` high and `off_ms` low per period:
//!
//! ```text
//! period_ms = round(1000 / frequency_hz)
//! on_ms     = round(duty_cycle * period_ms)
//! off_ms    = period_ms - on_ms
//! ```
//!
//! Resolution is one millisecond, so frequencies above 1 kHz are rejected.
//! Jitter on every edge equals the caller's poll latency; there are no
//! real-time guarantees. Each edge is scheduled from the previous deadline,
//! so latency does not accumulate into the period.
//!
//! # Example
//!
//! ```
//! use rpi_toolkit_core::gpio::Gpio;
//! use rpi_toolkit_core::pwm::{PwmConfig, SoftPwm};
//! use rpi_toolkit_core::registers::SimulatedGpio;
//! use rpi_toolkit_core::traits::MockTime;
//!
//! let time = MockTime::new();
//! let mut gpio = Gpio::new(SimulatedGpio::new());
//! let mut pwm = SoftPwm::new(21, PwmConfig::new(100.0, 0.5))?;
//! pwm.start(&time, &mut gpio)?;
//! for _ in 0..20 {
//!     time.advance_ms(1);
//!     pwm.poll(&time, &mut gpio)?;
//! }
//! # Ok::<(), rpi_toolkit_core::ToolkitError>(())
//! ```

use libm::roundf;

use super::{validate_duty, PwmConfig};
use crate::error::{Result, ToolkitError};
use crate::gpio::{validate_pin, Gpio, Level, PinMode};
use crate::registers::RegisterBank;
use crate::timer::Timer;
use crate::traits::TimeSource;

/// Phase lengths derived from a [`PwmConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoftPwmSchedule {
    pub on_ms: u64,
    pub off_ms: u64,
}

impl SoftPwmSchedule {
    pub fn from_config(config: &PwmConfig) -> Result<Self> {
        config.validate()?;
        let period = 1000.0 / config.frequency_hz;
        if period < 1.0 {
            return Err(ToolkitError::InvalidConfiguration {
                reason: "software PWM cannot exceed 1 kHz",
            });
        }
        let period_ms = roundf(period) as u64;
        let on_ms = (roundf(config.duty_cycle * period_ms as f32) as u64).min(period_ms);
        Ok(Self {
            on_ms,
            off_ms: period_ms - on_ms,
        })
    }

    pub fn period_ms(&self) -> u64 {
        self.on_ms + self.off_ms
    }

    fn phase_ms(&self, level: Level) -> u64 {
        match level {
            Level::High => self.on_ms,
            Level::Low => self.off_ms,
        }
    }
}

/// Polled PWM state machine for one pin
///
/// Holds no hardware resource: dropping it (or simply not polling it) stops
/// the waveform where it is. Call [`stop`](Self::stop) to leave the pin low.
#[derive(Debug, Clone)]
pub struct SoftPwm {
    pin: u8,
    config: PwmConfig,
    schedule: SoftPwmSchedule,
    level: Level,
    timer: Timer,
    running: bool,
}

impl SoftPwm {
    /// Validate the pin and configuration; nothing is written until
    /// [`start`](Self::start)
    pub fn new(pin: u8, config: PwmConfig) -> Result<Self> {
        let pin = validate_pin(pin as u32)?;
        let schedule = SoftPwmSchedule::from_config(&config)?;
        Ok(Self {
            pin,
            config,
            schedule,
            level: Level::Low,
            timer: Timer::new(),
            running: false,
        })
    }

    /// Configure the pin as an output and enter the first phase
    ///
    /// Starts high, or low when the duty cycle rounds to zero on-time.
    pub fn start<T: TimeSource, B: RegisterBank>(
        &mut self,
        clock: &T,
        gpio: &mut Gpio<B>,
    ) -> Result<()> {
        gpio.pin_mode(self.pin, PinMode::Output)?;
        let level = if self.schedule.on_ms == 0 {
            Level::Low
        } else {
            Level::High
        };
        gpio.digital_write(self.pin, level)?;
        self.level = level;
        self.timer.set(clock, self.schedule.phase_ms(level));
        self.running = true;
        Ok(())
    }

    /// Advance the state machine; returns true when the pin changed level
    ///
    /// A phase whose length is zero is skipped, which keeps duty 0.0
    /// permanently low and duty 1.0 permanently high.
    pub fn poll<T: TimeSource, B: RegisterBank>(
        &mut self,
        clock: &T,
        gpio: &mut Gpio<B>,
    ) -> Result<bool> {
        if !self.running || !self.timer.expired(clock) {
            return Ok(false);
        }

        let mut next = !self.level;
        if self.schedule.phase_ms(next) == 0 {
            next = self.level;
        }
        let changed = next != self.level;
        if changed {
            gpio.digital_write(self.pin, next)?;
            self.level = next;
        }
        self.timer.rearm_from_deadline(self.schedule.phase_ms(next));
        Ok(changed)
    }

    /// Drive the pin low and stop reacting to polls
    pub fn stop<B: RegisterBank>(&mut self, gpio: &mut Gpio<B>) -> Result<()> {
        self.running = false;
        gpio.digital_write(self.pin, Level::Low)?;
        self.level = Level::Low;
        Ok(())
    }

    /// Change the duty cycle; takes effect from the next edge
    pub fn set_duty_cycle(&mut self, duty_cycle: f32) -> Result<()> {
        validate_duty(duty_cycle)?;
        self.reconfigure(PwmConfig {
            duty_cycle,
            ..self.config
        })
    }

    /// Change the frequency; takes effect from the next edge
    pub fn set_frequency(&mut self, frequency_hz: f32) -> Result<()> {
        self.reconfigure(PwmConfig {
            frequency_hz,
            ..self.config
        })
    }

    fn reconfigure(&mut self, config: PwmConfig) -> Result<()> {
        self.schedule = SoftPwmSchedule::from_config(&config)?;
        self.config = config;
        Ok(())
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn config(&self) -> PwmConfig {
        self.config
    }

    pub fn schedule(&self) -> SoftPwmSchedule {
        self.schedule
    }

    /// Level the generator last drove
    pub fn level(&self) -> Level {
        self.level
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::SimulatedGpio;
    use crate::traits::MockTime;

    fn setup(config: PwmConfig) -> (MockTime, Gpio<SimulatedGpio>, SoftPwm) {
        let time = MockTime::new();
        let gpio = Gpio::new(SimulatedGpio::new());
        let pwm = SoftPwm::new(18, config).unwrap();
        (time, gpio, pwm)
    }

    /// Poll every millisecond for `iterations`, returning the durations of
    /// each completed phase as (level, ms)
    fn run(
        time: &MockTime,
        gpio: &mut Gpio<SimulatedGpio>,
        pwm: &mut SoftPwm,
        iterations: u64,
    ) -> Vec<(Level, u64)> {
        let mut phases = Vec::new();
        let mut phase_start = time.now_ms();
        let mut level = gpio.digital_read(18).unwrap();
        for _ in 0..iterations {
            time.advance_ms(1);
            pwm.poll(time, gpio).unwrap();
            let now_level = gpio.digital_read(18).unwrap();
            if now_level != level {
                phases.push((level, time.now_ms() - phase_start));
                phase_start = time.now_ms();
                level = now_level;
            }
        }
        phases
    }

    #[test]
    fn schedule_from_config() {
        let s = SoftPwmSchedule::from_config(&PwmConfig::new(100.0, 0.5)).unwrap();
        assert_eq!(s, SoftPwmSchedule { on_ms: 5, off_ms: 5 });

        let s = SoftPwmSchedule::from_config(&PwmConfig::new(50.0, 0.25)).unwrap();
        assert_eq!(s, SoftPwmSchedule { on_ms: 5, off_ms: 15 });
        assert_eq!(s.period_ms(), 20);

        let s = SoftPwmSchedule::from_config(&PwmConfig::new(1000.0, 0.4)).unwrap();
        assert_eq!(s, SoftPwmSchedule { on_ms: 0, off_ms: 1 });
    }

    #[test]
    fn schedule_rejects_unrepresentable() {
        assert!(SoftPwmSchedule::from_config(&PwmConfig::new(2000.0, 0.5)).is_err());
        assert!(SoftPwmSchedule::from_config(&PwmConfig::new(100.0, 2.0)).is_err());
        assert!(SoftPwm::new(54, PwmConfig::new(100.0, 0.5)).is_err());
    }

    #[test]
    fn half_duty_100hz_has_5ms_phases() {
        let (time, mut gpio, mut pwm) = setup(PwmConfig::new(100.0, 0.5));
        pwm.start(&time, &mut gpio).unwrap();
        assert_eq!(gpio.digital_read(18).unwrap(), Level::High);

        let phases = run(&time, &mut gpio, &mut pwm, 1000);
        assert!(phases.len() >= 198);
        for (_, duration) in &phases {
            assert!((4..=6).contains(duration), "phase lasted {} ms", duration);
        }
        assert!(phases.windows(2).all(|w| w[0].0 != w[1].0));
    }

    #[test]
    fn zero_duty_stays_low() {
        let (time, mut gpio, mut pwm) = setup(PwmConfig::new(100.0, 0.0));
        pwm.start(&time, &mut gpio).unwrap();
        assert_eq!(gpio.digital_read(18).unwrap(), Level::Low);
        assert!(run(&time, &mut gpio, &mut pwm, 200).is_empty());
        assert_eq!(gpio.digital_read(18).unwrap(), Level::Low);
    }

    #[test]
    fn full_duty_stays_high() {
        let (time, mut gpio, mut pwm) = setup(PwmConfig::new(100.0, 1.0));
        pwm.start(&time, &mut gpio).unwrap();
        assert!(run(&time, &mut gpio, &mut pwm, 200).is_empty());
        assert_eq!(gpio.digital_read(18).unwrap(), Level::High);
    }

    #[test]
    fn stalled_poll_does_not_drift() {
        let (time, mut gpio, mut pwm) = setup(PwmConfig::new(50.0, 0.5));
        pwm.start(&time, &mut gpio).unwrap();

        // first edge due at 10 ms, noticed at 13 ms
        time.advance_ms(13);
        assert!(pwm.poll(&time, &mut gpio).unwrap());
        assert_eq!(pwm.level(), Level::Low);

        // next edge is still due at 20 ms
        time.set(19_000);
        assert!(!pwm.poll(&time, &mut gpio).unwrap());
        time.set(20_000);
        assert!(pwm.poll(&time, &mut gpio).unwrap());
        assert_eq!(pwm.level(), Level::High);
    }

    #[test]
    fn duty_change_applies_on_next_edge() {
        let (time, mut gpio, mut pwm) = setup(PwmConfig::new(100.0, 0.5));
        pwm.start(&time, &mut gpio).unwrap();
        pwm.set_duty_cycle(0.2).unwrap();
        assert_eq!(pwm.schedule(), SoftPwmSchedule { on_ms: 2, off_ms: 8 });

        // current high phase still ends at 5 ms, then 8 ms low
        time.advance_ms(5);
        assert!(pwm.poll(&time, &mut gpio).unwrap());
        time.advance_ms(7);
        assert!(!pwm.poll(&time, &mut gpio).unwrap());
        time.advance_ms(1);
        assert!(pwm.poll(&time, &mut gpio).unwrap());
        assert_eq!(pwm.level(), Level::High);

        assert!(pwm.set_duty_cycle(1.5).is_err());
        assert!(pwm.set_frequency(0.0).is_err());
        assert_eq!(pwm.config().duty_cycle, 0.2);
    }

    #[test]
    fn stop_drives_low_and_ignores_polls() {
        let (time, mut gpio, mut pwm) = setup(PwmConfig::new(10.0, 0.5));
        pwm.start(&time, &mut gpio).unwrap();
        pwm.stop(&mut gpio).unwrap();
        assert!(!pwm.is_running());
        assert_eq!(gpio.digital_read(18).unwrap(), Level::Low);

        time.advance_ms(500);
        assert!(!pwm.poll(&time, &mut gpio).unwrap());
        assert_eq!(gpio.digital_read(18).unwrap(), Level::Low);
    }
}
