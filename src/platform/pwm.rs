//! PWM block and PWM clock on Linux
//!
//! Neither block is exposed by `/dev/gpiomem`, so both are mapped from
//! `/dev/mem` (root only) at the peripheral base.

use std::sync::atomic::AtomicBool;

use rpi_toolkit_core::registers::clock::{CLOCK_BLOCK_OFFSET, CLOCK_BLOCK_SIZE};
use rpi_toolkit_core::registers::pwm::{PWM_BLOCK_OFFSET, PWM_BLOCK_SIZE};
use rpi_toolkit_core::registers::RegisterBank;
use rpi_toolkit_core::HwPwm;

use super::error::Result;
use super::mmap::MappedRegion;
use super::Claim;
use crate::config::BoardConfig;
use crate::log_info;

static PWM_CLAIMED: AtomicBool = AtomicBool::new(false);

/// The process's PWM register window; holds the PWM claim
#[derive(Debug)]
pub struct PwmMem {
    region: MappedRegion,
    _claim: Claim,
}

/// Hardware PWM driver over the mapped PWM and clock manager blocks
pub type HwPwmDriver = HwPwm<PwmMem, MappedRegion>;

impl RegisterBank for PwmMem {
    fn read(&self, offset: usize) -> u32 {
        self.region.read(offset)
    }

    fn write(&mut self, offset: usize, value: u32) {
        self.region.write(offset, value)
    }

    fn size(&self) -> usize {
        self.region.size()
    }
}

/// Map the PWM and clock manager blocks and take over both channels
///
/// # Errors
///
/// `AlreadyInitialized` while another driver is alive, `HardwareAccess`
/// when `/dev/mem` cannot be mapped.
pub fn init(config: &BoardConfig) -> Result<HwPwmDriver> {
    let claim = Claim::acquire(&PWM_CLAIMED)?;
    let base = config.resolve_peripheral_base();
    let pwm = MappedRegion::open(&config.mem_path, base + PWM_BLOCK_OFFSET, PWM_BLOCK_SIZE)?;
    let clock = MappedRegion::open(&config.mem_path, base + CLOCK_BLOCK_OFFSET, CLOCK_BLOCK_SIZE)?;
    log_info!(
        "hardware PWM initialized at {:#x}, {} Hz oscillator",
        base,
        config.oscillator_hz
    );
    Ok(HwPwm::new(
        PwmMem {
            region: pwm,
            _claim: claim,
        },
        clock,
        config.oscillator_hz,
    ))
}

/// Stop both channels and the PWM clock, then unmap
pub fn cleanup(pwm: HwPwmDriver) {
    drop(pwm.release());
    log_info!("hardware PWM released");
}
