//! C ABI
//!
//! Exported with unmangled names for `ctypes` and C callers. Functions
//! return 0 (or a non-negative value) on success and a negative error code
//! on failure:
//!
//! | Code | Meaning                |
//! |------|------------------------|
//! | -1   | hardware access failed |
//! | -2   | not initialized        |
//! | -3   | invalid pin            |
//! | -4   | invalid pin state      |
//! | -5   | invalid configuration  |
//! | -6   | already initialized    |
//!
//! GPIO and hardware PWM drivers live in process-wide slots between their
//! `*_init` and `*_cleanup` calls. Calls are expected from one thread at a
//! time.

use std::ffi::c_int;
use std::ptr;

use rpi_toolkit_core::gpio::validate_pin;
use rpi_toolkit_core::pwm::{attach_pin, channel_for_pin};
use rpi_toolkit_core::{Level, PinMode, PwmChannel, PwmConfig, SoftPwm, Timer, ToolkitError};

use crate::config::BoardConfig;
use crate::platform::{
    self, DriverSlot, GpioDriver, HwPwmDriver, MonotonicClock, PlatformError, Result,
};
use crate::{log_debug, log_warn};

/// `pin_mode` argument for an input
pub const INPUT: c_int = 0;
/// `pin_mode` argument for an output
pub const OUTPUT: c_int = 1;

static GPIO: DriverSlot<GpioDriver> = DriverSlot::new();
static HW_PWM: DriverSlot<HwPwmDriver> = DriverSlot::new();

fn report(op: &'static str, result: Result<c_int>) -> c_int {
    match result {
        Ok(value) => value,
        Err(err) => {
            log_warn!("{} failed: {}", op, err);
            err.code()
        }
    }
}

fn pin_index(pin: c_int) -> Result<u8> {
    let index = u32::try_from(pin).map_err(|_| PlatformError::InvalidPin { pin: pin.into() })?;
    Ok(validate_pin(index)?)
}

fn channel_index(channel: c_int) -> Result<PwmChannel> {
    let channel = u32::try_from(channel).unwrap_or(u32::MAX);
    Ok(PwmChannel::from_index(channel)?)
}

fn pwm_channel_for(pin: u8) -> Result<PwmChannel> {
    let (channel, _) = channel_for_pin(pin).ok_or(ToolkitError::InvalidPin { pin: pin as u32 })?;
    Ok(channel)
}

// ============================================================================
// GPIO
// ============================================================================

/// Map the GPIO block; a no-op when already mapped
#[no_mangle]
pub extern "C" fn gpio_init() -> c_int {
    let result = GPIO.get_or_install(|| platform::gpio::init(&BoardConfig::from_env()));
    report("gpio_init", result.map(|()| 0))
}

/// Unmap the GPIO block; later GPIO calls return -2 until `gpio_init`
#[no_mangle]
pub extern "C" fn gpio_cleanup() {
    if let Some(gpio) = GPIO.take() {
        platform::gpio::cleanup(gpio);
    }
}

/// Configure `pin` as [`INPUT`] or [`OUTPUT`]
#[no_mangle]
pub extern "C" fn pin_mode(pin: c_int, mode: c_int) -> c_int {
    let result = (|| -> Result<c_int> {
        let pin = pin_index(pin)?;
        let mode = match mode {
            INPUT => PinMode::Input,
            OUTPUT => PinMode::Output,
            _ => {
                return Err(ToolkitError::InvalidConfiguration {
                    reason: "pin mode must be INPUT (0) or OUTPUT (1)",
                }
                .into())
            }
        };
        GPIO.with(|gpio| Ok(gpio.pin_mode(pin, mode)?))?;
        Ok(0)
    })();
    report("pin_mode", result)
}

/// Drive an output pin low (0) or high (any other value)
#[no_mangle]
pub extern "C" fn digital_write(pin: c_int, value: c_int) -> c_int {
    let result = (|| -> Result<c_int> {
        let pin = pin_index(pin)?;
        GPIO.with(|gpio| Ok(gpio.digital_write(pin, Level::from(value != 0))?))?;
        Ok(0)
    })();
    report("digital_write", result)
}

/// Level of `pin`: 0 or 1, or a negative error code
#[no_mangle]
pub extern "C" fn digital_read(pin: c_int) -> c_int {
    let result = (|| -> Result<c_int> {
        let pin = pin_index(pin)?;
        let level = GPIO.with(|gpio| Ok(gpio.digital_read(pin)?))?;
        Ok(c_int::from(level.is_high()))
    })();
    report("digital_read", result)
}

// ============================================================================
// Timer and clock
// ============================================================================

/// Arm `timer` to expire `interval_ms` from now
///
/// # Safety
///
/// `timer` must be null or point to a writable [`Timer`].
#[no_mangle]
pub unsafe extern "C" fn timer_set(timer: *mut Timer, interval_ms: u64) {
    // SAFETY: caller guarantees a valid pointer or null
    if let Some(timer) = unsafe { timer.as_mut() } {
        timer.set(&MonotonicClock, interval_ms);
    }
}

/// Whether `timer` is due; null is never due
///
/// # Safety
///
/// `timer` must be null or point to a readable [`Timer`].
#[no_mangle]
pub unsafe extern "C" fn timer_expired(timer: *const Timer) -> bool {
    // SAFETY: caller guarantees a valid pointer or null
    unsafe { timer.as_ref() }.is_some_and(|timer| timer.expired(&MonotonicClock))
}

/// Fire and re-arm `timer` if due
///
/// # Safety
///
/// `timer` must be null or point to a writable [`Timer`].
#[no_mangle]
pub unsafe extern "C" fn timer_tick(timer: *mut Timer) -> bool {
    // SAFETY: caller guarantees a valid pointer or null
    unsafe { timer.as_mut() }.is_some_and(|timer| timer.tick(&MonotonicClock))
}

/// Milliseconds from the monotonic clock
#[no_mangle]
pub extern "C" fn millis() -> u64 {
    platform::millis()
}

/// Microseconds from the monotonic clock
#[no_mangle]
pub extern "C" fn micros() -> u64 {
    platform::micros()
}

// ============================================================================
// Hardware PWM, by pin
// ============================================================================

/// Route a PWM-capable pin (12, 13, 18, 19) to its channel and start it at
/// the configured default frequency with 0 % duty
///
/// Needs `gpio_init` first; maps the PWM block on first use. The pin keeps
/// its current function if the PWM block cannot be set up.
#[no_mangle]
pub extern "C" fn pwm_init(pin: c_int) -> c_int {
    let result = (|| -> Result<c_int> {
        let pin = pin_index(pin)?;
        let channel = pwm_channel_for(pin)?;
        GPIO.with(|_| Ok(()))?;

        let config = BoardConfig::from_env();
        HW_PWM.get_or_install(|| platform::pwm::init(&config))?;
        let settings = HW_PWM.with(|pwm| {
            Ok(pwm.set_frequency_duty(
                channel,
                PwmConfig::new(config.default_pwm_frequency_hz, 0.0),
            )?)
        })?;

        GPIO.with(|gpio| Ok(attach_pin(gpio, pin)?))?;
        HW_PWM.with(|pwm| Ok(pwm.enable(channel)?))?;
        log_debug!("pin {} on {:?}: {:?}", pin, channel, settings);
        Ok(0)
    })();
    report("pwm_init", result)
}

/// Set the duty cycle of a pin started with `pwm_init`, in percent (0..=100)
#[no_mangle]
pub extern "C" fn pwm_write(pin: c_int, duty_percent: c_int) -> c_int {
    let result = (|| -> Result<c_int> {
        let channel = pwm_channel_for(pin_index(pin)?)?;
        let duty = duty_percent as f32 / 100.0;
        HW_PWM.with(|pwm| {
            pwm.set_duty(channel, duty)?;
            Ok(0)
        })
    })();
    report("pwm_write", result)
}

/// Stop PWM output on a pin; the channel keeps its configuration
#[no_mangle]
pub extern "C" fn pwm_stop(pin: c_int) -> c_int {
    let result = (|| -> Result<c_int> {
        let channel = pwm_channel_for(pin_index(pin)?)?;
        HW_PWM.with(|pwm| {
            pwm.disable(channel);
            Ok(0)
        })
    })();
    report("pwm_stop", result)
}

// ============================================================================
// Hardware PWM, by channel
// ============================================================================

/// Map the PWM and clock manager blocks; a no-op when already mapped
#[no_mangle]
pub extern "C" fn hw_pwm_init() -> c_int {
    let result = HW_PWM.get_or_install(|| platform::pwm::init(&BoardConfig::from_env()));
    report("hw_pwm_init", result.map(|()| 0))
}

/// Stop both channels and the PWM clock, then unmap
#[no_mangle]
pub extern "C" fn hw_pwm_cleanup() {
    if let Some(pwm) = HW_PWM.take() {
        platform::pwm::cleanup(pwm);
    }
}

/// Route `pin` to its PWM channel; returns the channel (0 or 1)
#[no_mangle]
pub extern "C" fn hw_pwm_attach(pin: c_int) -> c_int {
    let result = (|| -> Result<c_int> {
        let pin = pin_index(pin)?;
        let channel = GPIO.with(|gpio| Ok(attach_pin(gpio, pin)?))?;
        Ok(channel.index() as c_int)
    })();
    report("hw_pwm_attach", result)
}

/// Program `channel` (0 or 1) for `frequency` Hz at `duty` (0.0..=1.0)
#[no_mangle]
pub extern "C" fn hw_pwm_set(channel: c_int, frequency: f32, duty: f32) -> c_int {
    let result = (|| -> Result<c_int> {
        let channel = channel_index(channel)?;
        let config = PwmConfig::new(frequency, duty);
        config.validate()?;
        HW_PWM.with(|pwm| {
            pwm.set_frequency_duty(channel, config)?;
            Ok(0)
        })
    })();
    report("hw_pwm_set", result)
}

/// Start output on a channel configured with `hw_pwm_set`
#[no_mangle]
pub extern "C" fn hw_pwm_enable(channel: c_int) -> c_int {
    let result = (|| -> Result<c_int> {
        let channel = channel_index(channel)?;
        HW_PWM.with(|pwm| {
            pwm.enable(channel)?;
            Ok(0)
        })
    })();
    report("hw_pwm_enable", result)
}

/// Stop output on a channel, keeping its configuration
#[no_mangle]
pub extern "C" fn hw_pwm_disable(channel: c_int) -> c_int {
    let result = (|| -> Result<c_int> {
        let channel = channel_index(channel)?;
        HW_PWM.with(|pwm| {
            pwm.disable(channel);
            Ok(0)
        })
    })();
    report("hw_pwm_disable", result)
}

// ============================================================================
// Software PWM
// ============================================================================

/// Start software PWM on `pin`; null on error
///
/// Needs `gpio_init` first. The returned handle must be released with
/// `soft_pwm_destroy`.
#[no_mangle]
pub extern "C" fn soft_pwm_create(pin: c_int, frequency: f32, duty: f32) -> *mut SoftPwm {
    let result = (|| -> Result<SoftPwm> {
        let pin = pin_index(pin)?;
        let mut soft = SoftPwm::new(pin, PwmConfig::new(frequency, duty))?;
        GPIO.with(|gpio| Ok(soft.start(&MonotonicClock, gpio)?))?;
        Ok(soft)
    })();
    match result {
        Ok(soft) => Box::into_raw(Box::new(soft)),
        Err(err) => {
            log_warn!("soft_pwm_create failed: {}", err);
            ptr::null_mut()
        }
    }
}

/// Advance a software PWM; 1 when the pin changed level, 0 when not
///
/// # Safety
///
/// `handle` must be null or a live pointer from `soft_pwm_create`.
#[no_mangle]
pub unsafe extern "C" fn soft_pwm_poll(handle: *mut SoftPwm) -> c_int {
    // SAFETY: caller guarantees a live handle or null
    let Some(soft) = (unsafe { handle.as_mut() }) else {
        return ToolkitError::NotInitialized.code();
    };
    let result = GPIO.with(|gpio| Ok(soft.poll(&MonotonicClock, gpio)?));
    report("soft_pwm_poll", result.map(c_int::from))
}

/// Change the duty cycle (0.0..=1.0) from the next edge
///
/// # Safety
///
/// `handle` must be null or a live pointer from `soft_pwm_create`.
#[no_mangle]
pub unsafe extern "C" fn soft_pwm_set_duty(handle: *mut SoftPwm, duty: f32) -> c_int {
    // SAFETY: caller guarantees a live handle or null
    let Some(soft) = (unsafe { handle.as_mut() }) else {
        return ToolkitError::NotInitialized.code();
    };
    let result = soft.set_duty_cycle(duty).map(|()| 0).map_err(Into::into);
    report("soft_pwm_set_duty", result)
}

/// Drive the pin low and free the handle
///
/// # Safety
///
/// `handle` must be null or a pointer from `soft_pwm_create` that has not
/// been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn soft_pwm_destroy(handle: *mut SoftPwm) {
    if handle.is_null() {
        return;
    }
    // SAFETY: non-null handles come from Box::into_raw in soft_pwm_create
    let mut soft = unsafe { Box::from_raw(handle) };
    if let Err(err) = GPIO.with(|gpio| Ok(soft.stop(gpio)?)) {
        log_debug!("soft_pwm_destroy left pin {} as is: {}", soft.pin(), err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // None of these map hardware; GPIO and PWM slots stay empty

    #[test]
    fn gpio_calls_before_init_are_not_initialized() {
        assert_eq!(pin_mode(21, OUTPUT), -2);
        assert_eq!(digital_write(21, 1), -2);
        assert_eq!(digital_read(21), -2);
        assert_eq!(hw_pwm_attach(18), -2);
    }

    #[test]
    fn arguments_are_checked_before_driver_state() {
        assert_eq!(pin_mode(54, OUTPUT), -3);
        assert_eq!(pin_mode(-1, OUTPUT), -3);
        assert_eq!(pin_mode(21, 7), -5);
        assert_eq!(digital_read(1000), -3);
        assert_eq!(pwm_init(21), -3);
        assert_eq!(pwm_write(4, 50), -3);
        assert_eq!(hw_pwm_set(2, 1000.0, 0.5), -5);
        assert_eq!(hw_pwm_set(0, -5.0, 0.5), -5);
        assert_eq!(hw_pwm_enable(-1), -5);
    }

    #[test]
    fn negative_pin_is_reported_as_passed() {
        let err = pin_index(-1).unwrap_err();
        assert_eq!(err.to_string(), "invalid GPIO pin -1");
        assert_eq!(err.code(), -3);
        assert_eq!(pin_index(54).unwrap_err().to_string(), "invalid GPIO pin 54");
        assert_eq!(pin_index(18).unwrap(), 18);
    }

    #[test]
    fn pwm_calls_before_init_are_not_initialized() {
        assert_eq!(pwm_init(18), -2);
        assert_eq!(pwm_write(18, 50), -2);
        assert_eq!(pwm_stop(19), -2);
        assert_eq!(hw_pwm_set(0, 1000.0, 0.5), -2);
        assert_eq!(hw_pwm_enable(1), -2);
        assert_eq!(hw_pwm_disable(0), -2);
        hw_pwm_cleanup();
        gpio_cleanup();
    }

    #[test]
    fn soft_pwm_handles() {
        assert!(soft_pwm_create(21, 100.0, 0.5).is_null());
        assert!(soft_pwm_create(21, 5000.0, 0.5).is_null());
        unsafe {
            assert_eq!(soft_pwm_poll(ptr::null_mut()), -2);
            assert_eq!(soft_pwm_set_duty(ptr::null_mut(), 0.5), -2);
            soft_pwm_destroy(ptr::null_mut());
        }
    }

    #[test]
    fn timer_through_c_abi() {
        let mut timer = Timer::default();
        unsafe {
            timer_set(&mut timer, 60_000);
            assert!(!timer_expired(&timer));
            assert!(!timer_tick(&mut timer));

            timer_set(&mut timer, 0);
            assert!(timer_expired(&timer));
            assert!(timer_tick(&mut timer));

            timer_set(ptr::null_mut(), 10);
            assert!(!timer_expired(ptr::null()));
            assert!(!timer_tick(ptr::null_mut()));
        }
    }

    #[test]
    fn clock_functions_are_monotonic() {
        let a = micros();
        let b = micros();
        assert!(b >= a);
        assert!(millis() >= a / 1000);
    }
}
