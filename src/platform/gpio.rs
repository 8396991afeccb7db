//! GPIO block on Linux
//!
//! [`init`] maps the GPIO registers once per process and returns the
//! register driver over them. The window comes from `/dev/gpiomem` when the
//! kernel provides it (no root needed); otherwise from `/dev/mem` at the
//! peripheral base plus [`GPIO_BLOCK_OFFSET`].

use std::sync::atomic::AtomicBool;

use rpi_toolkit_core::registers::gpio::{GPIO_BLOCK_OFFSET, GPIO_BLOCK_SIZE};
use rpi_toolkit_core::registers::RegisterBank;
use rpi_toolkit_core::Gpio;

use super::error::Result;
use super::mmap::MappedRegion;
use super::Claim;
use crate::config::BoardConfig;
use crate::{log_info, log_warn};

static GPIO_CLAIMED: AtomicBool = AtomicBool::new(false);

/// The process's GPIO register window
///
/// Only one exists at a time; dropping it unmaps the block and allows the
/// next [`init`].
#[derive(Debug)]
pub struct GpioMem {
    region: MappedRegion,
    _claim: Claim,
}

/// GPIO driver over the mapped block
pub type GpioDriver = Gpio<GpioMem>;

impl GpioMem {
    /// Claim and map the GPIO block
    ///
    /// # Errors
    ///
    /// `AlreadyInitialized` while another `GpioMem` is alive,
    /// `HardwareAccess` when neither device can be mapped.
    pub fn open(config: &BoardConfig) -> Result<Self> {
        let claim = Claim::acquire(&GPIO_CLAIMED)?;
        let region = Self::map(config)?;
        Ok(Self {
            region,
            _claim: claim,
        })
    }

    fn map(config: &BoardConfig) -> Result<MappedRegion> {
        match MappedRegion::open(&config.gpiomem_path, 0, GPIO_BLOCK_SIZE) {
            Ok(region) => Ok(region),
            Err(err) => {
                log_warn!("{}, falling back to {}", err, config.mem_path.display());
                let base = config.resolve_peripheral_base();
                MappedRegion::open(&config.mem_path, base + GPIO_BLOCK_OFFSET, GPIO_BLOCK_SIZE)
            }
        }
    }

    pub fn region(&self) -> &MappedRegion {
        &self.region
    }
}

impl RegisterBank for GpioMem {
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

/// Map the GPIO block and wrap it in the register driver
pub fn init(config: &BoardConfig) -> Result<GpioDriver> {
    let mem = GpioMem::open(config)?;
    log_info!("GPIO initialized from {}", mem.region.path().display());
    Ok(Gpio::new(mem))
}

/// Unmap the GPIO block; pins keep their last configuration
pub fn cleanup(gpio: GpioDriver) {
    drop(gpio.release());
    log_info!("GPIO released");
}
