//! Board configuration
//!
//! Defaults are captured at build time by `build.rs` from the
//! `RPI_TOOLKIT_*` environment variables. [`BoardConfig::from_env`] applies
//! the same variables again at run time, plus the device paths.
//!
//! | Variable                      | Field                       |
//! |-------------------------------|-----------------------------|
//! | `RPI_TOOLKIT_GPIOMEM`         | `gpiomem_path`              |
//! | `RPI_TOOLKIT_MEM`             | `mem_path`                  |
//! | `RPI_TOOLKIT_PERIPHERAL_BASE` | `peripheral_base`           |
//! | `RPI_TOOLKIT_OSC_HZ`          | `oscillator_hz`             |
//! | `RPI_TOOLKIT_PWM_FREQ_HZ`     | `default_pwm_frequency_hz`  |

use std::path::{Path, PathBuf};

use rpi_toolkit_core::registers::clock::OSCILLATOR_HZ;

use crate::{log_debug, log_warn};

/// GPIO-only device exposed by the Raspberry Pi kernel, usable without root
pub const GPIOMEM_PATH: &str = "/dev/gpiomem";

/// Physical memory device; needs root
pub const MEM_PATH: &str = "/dev/mem";

/// Device-tree node describing the SoC bus to CPU address translation
pub const SOC_RANGES_PATH: &str = "/proc/device-tree/soc/ranges";

/// BCM2836/BCM2837 peripheral base, used when detection fails
pub const DEFAULT_PERIPHERAL_BASE: u64 = 0x3F00_0000;

/// Fallback PWM frequency for the single-pin `pwm_*` C functions
pub const DEFAULT_PWM_FREQUENCY_HZ: f32 = 1000.0;

const BUILD_PERIPHERAL_BASE: &str = env!("RPI_TOOLKIT_PERIPHERAL_BASE");
const BUILD_OSC_HZ: &str = env!("RPI_TOOLKIT_OSC_HZ");
const BUILD_PWM_FREQ_HZ: &str = env!("RPI_TOOLKIT_PWM_FREQ_HZ");

/// Where the peripherals live and how they are clocked
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    /// GPIO-only window, tried first
    pub gpiomem_path: PathBuf,
    /// Full physical memory, used for PWM/clock and as GPIO fallback
    pub mem_path: PathBuf,
    /// Physical peripheral base; `None` detects it from the device tree
    pub peripheral_base: Option<u64>,
    /// Clock manager oscillator feeding the PWM divider
    pub oscillator_hz: u32,
    /// Frequency used when a pin is driven with `pwm_init` / `pwm_write`
    pub default_pwm_frequency_hz: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            gpiomem_path: PathBuf::from(GPIOMEM_PATH),
            mem_path: PathBuf::from(MEM_PATH),
            peripheral_base: parse_u64(BUILD_PERIPHERAL_BASE),
            oscillator_hz: parse_u64(BUILD_OSC_HZ)
                .and_then(|hz| u32::try_from(hz).ok())
                .filter(|&hz| hz > 0)
                .unwrap_or(OSCILLATOR_HZ),
            default_pwm_frequency_hz: parse_frequency(BUILD_PWM_FREQ_HZ)
                .unwrap_or(DEFAULT_PWM_FREQUENCY_HZ),
        }
    }
}

impl BoardConfig {
    /// Build-time defaults overridden by the process environment
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("RPI_TOOLKIT_GPIOMEM") {
            self.gpiomem_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("RPI_TOOLKIT_MEM") {
            self.mem_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("RPI_TOOLKIT_PERIPHERAL_BASE") {
            match parse_u64(&raw) {
                Some(base) => self.peripheral_base = Some(base),
                None => log_warn!("ignoring RPI_TOOLKIT_PERIPHERAL_BASE={:?}", raw),
            }
        }
        if let Some(raw) = lookup("RPI_TOOLKIT_OSC_HZ") {
            match parse_u64(&raw).and_then(|hz| u32::try_from(hz).ok()) {
                Some(hz) if hz > 0 => self.oscillator_hz = hz,
                _ => log_warn!("ignoring RPI_TOOLKIT_OSC_HZ={:?}", raw),
            }
        }
        if let Some(raw) = lookup("RPI_TOOLKIT_PWM_FREQ_HZ") {
            match parse_frequency(&raw) {
                Some(hz) => self.default_pwm_frequency_hz = hz,
                None => log_warn!("ignoring RPI_TOOLKIT_PWM_FREQ_HZ={:?}", raw),
            }
        }
        self
    }

    /// Configured peripheral base, else the device-tree value, else
    /// [`DEFAULT_PERIPHERAL_BASE`]
    pub fn resolve_peripheral_base(&self) -> u64 {
        if let Some(base) = self.peripheral_base {
            return base;
        }
        match detect_peripheral_base(Path::new(SOC_RANGES_PATH)) {
            Some(base) => {
                log_debug!("peripheral base {:#x} from device tree", base);
                base
            }
            None => {
                log_debug!(
                    "no usable {}, assuming peripheral base {:#x}",
                    SOC_RANGES_PATH,
                    DEFAULT_PERIPHERAL_BASE
                );
                DEFAULT_PERIPHERAL_BASE
            }
        }
    }
}

/// Read and decode a device-tree `ranges` property
pub fn detect_peripheral_base(path: &Path) -> Option<u64> {
    let ranges = std::fs::read(path).ok()?;
    parse_soc_ranges(&ranges)
}

/// Decode the CPU address of the first `ranges` entry
///
/// Cells are big-endian u32. Older SoCs use one cell for the parent
/// address (`child, parent, size`); BCM2711 uses two (`child, parent_hi,
/// parent_lo, size`), recognised by a zero in the second cell.
pub fn parse_soc_ranges(ranges: &[u8]) -> Option<u64> {
    let cell = |index: usize| -> Option<u32> {
        let bytes = ranges.get(index * 4..index * 4 + 4)?;
        Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    };

    match cell(1)? {
        0 => {
            let low = cell(2)?;
            (low != 0).then_some(u64::from(low))
        }
        base => Some(u64::from(base)),
    }
}

/// Decimal or `0x`-prefixed hexadecimal; empty means unset
fn parse_u64(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(&hex.replace('_', ""), 16).ok(),
        None => raw.replace('_', "").parse().ok(),
    }
}

fn parse_frequency(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|hz| hz.is_finite() && *hz > 0.0)
}
