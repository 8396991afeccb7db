use std::env;

fn main() {
    // Board defaults baked into BoardConfig::default(); runtime overrides go
    // through BoardConfig::from_env()

    // Peripheral base address (hex with 0x prefix, or empty to detect)
    if let Ok(base) = env::var("RPI_TOOLKIT_PERIPHERAL_BASE") {
        println!("cargo:rustc-env=RPI_TOOLKIT_PERIPHERAL_BASE={}", base);
        println!(
            "cargo:warning=Using RPI_TOOLKIT_PERIPHERAL_BASE from environment: {}",
            base
        );
    } else {
        println!("cargo:rustc-env=RPI_TOOLKIT_PERIPHERAL_BASE=");
    }

    // PWM oscillator frequency
    if let Ok(osc) = env::var("RPI_TOOLKIT_OSC_HZ") {
        println!("cargo:rustc-env=RPI_TOOLKIT_OSC_HZ={}", osc);
        println!(
            "cargo:warning=Using RPI_TOOLKIT_OSC_HZ from environment: {}",
            osc
        );
    } else {
        println!("cargo:rustc-env=RPI_TOOLKIT_OSC_HZ=19200000");
    }

    // Frequency used by pwm_init / pwm_write
    if let Ok(freq) = env::var("RPI_TOOLKIT_PWM_FREQ_HZ") {
        println!("cargo:rustc-env=RPI_TOOLKIT_PWM_FREQ_HZ={}", freq);
        println!(
            "cargo:warning=Using RPI_TOOLKIT_PWM_FREQ_HZ from environment: {}",
            freq
        );
    } else {
        println!("cargo:rustc-env=RPI_TOOLKIT_PWM_FREQ_HZ=1000");
    }

    // Rerun if environment variables change
    println!("cargo:rerun-if-env-changed=RPI_TOOLKIT_PERIPHERAL_BASE");
    println!("cargo:rerun-if-env-changed=RPI_TOOLKIT_OSC_HZ");
    println!("cargo:rerun-if-env-changed=RPI_TOOLKIT_PWM_FREQ_HZ");
}
