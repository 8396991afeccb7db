use rpi_toolkit::platform::DriverSlot;
use rpi_toolkit::{Gpio, Level, PinMode, PlatformError};
use rpi_toolkit_core::registers::SimulatedGpio;

#[test]
fn init_cleanup_then_not_initialized() {
    let slot: DriverSlot<Gpio<SimulatedGpio>> = DriverSlot::new();

    slot.install(Gpio::new(SimulatedGpio::new())).unwrap();
    slot.with(|gpio| {
        gpio.pin_mode(21, PinMode::Output)?;
        gpio.digital_write(21, Level::High)?;
        Ok(())
    })
    .unwrap();

    let gpio = slot.take().unwrap();
    assert_eq!(gpio.digital_read(21).unwrap(), Level::High);

    let err = slot
        .with(|gpio| Ok(gpio.digital_read(21)?))
        .unwrap_err();
    assert!(matches!(err, PlatformError::NotInitialized));
    assert_eq!(err.code(), -2);

    slot.install(gpio).unwrap();
    assert!(slot.is_installed());
}

#[test]
fn double_install_is_rejected() {
    let slot = DriverSlot::new();
    slot.install(Gpio::new(SimulatedGpio::new())).unwrap();
    let err = slot.install(Gpio::new(SimulatedGpio::new())).unwrap_err();
    assert!(matches!(err, PlatformError::AlreadyInitialized));
    assert_eq!(err.code(), -6);
}

#[test]
fn driver_errors_keep_their_codes() {
    let slot = DriverSlot::new();
    slot.install(Gpio::new(SimulatedGpio::new())).unwrap();

    let err = slot
        .with(|gpio| Ok(gpio.pin_mode(60, PinMode::Output)?))
        .unwrap_err();
    assert_eq!(err.code(), -3);

    let err = slot
        .with(|gpio| {
            gpio.pin_mode(4, PinMode::Input)?;
            Ok(gpio.digital_write(4, Level::High)?)
        })
        .unwrap_err();
    assert_eq!(err.code(), -4);
    assert!(err.to_string().contains("4"));
}
