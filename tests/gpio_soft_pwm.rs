use rpi_toolkit::{Function, Gpio, Level, MockTime, PinMode, PwmConfig, SoftPwm};
use rpi_toolkit_core::registers::gpio::GPFSEL0;
use rpi_toolkit_core::registers::{RegisterBank, SimulatedGpio};

#[test]
fn neighbouring_pins_keep_their_configuration() {
    let mut gpio = Gpio::new(SimulatedGpio::new());

    // 20, 21, 22 share GPFSEL2 and the first level word
    gpio.set_function(22, Function::Alt0).unwrap();
    gpio.pin_mode(20, PinMode::Output).unwrap();
    gpio.pin_mode(21, PinMode::Output).unwrap();
    gpio.digital_write(20, Level::High).unwrap();
    gpio.digital_write(21, Level::Low).unwrap();

    assert_eq!(gpio.function(22).unwrap(), Function::Alt0);
    assert_eq!(gpio.digital_read(20).unwrap(), Level::High);
    assert_eq!(gpio.digital_read(21).unwrap(), Level::Low);

    gpio.digital_write(21, Level::High).unwrap();
    gpio.digital_write(20, Level::Low).unwrap();
    assert_eq!(gpio.digital_read(20).unwrap(), Level::Low);
    assert_eq!(gpio.digital_read(21).unwrap(), Level::High);
    assert_eq!(gpio.bank().read(GPFSEL0 + 8), 0b100_001_001);
}

#[test]
fn two_soft_pwms_on_one_register_word() {
    let time = MockTime::new();
    let mut gpio = Gpio::new(SimulatedGpio::new());

    let mut fast = SoftPwm::new(20, PwmConfig::new(100.0, 0.5)).unwrap();
    let mut slow = SoftPwm::new(21, PwmConfig::new(50.0, 0.25)).unwrap();
    fast.start(&time, &mut gpio).unwrap();
    slow.start(&time, &mut gpio).unwrap();

    let mut fast_edges = 0;
    let mut slow_edges = 0;
    let mut slow_high_ms = 0;
    for _ in 0..1000 {
        time.advance_ms(1);
        if fast.poll(&time, &mut gpio).unwrap() {
            fast_edges += 1;
        }
        if slow.poll(&time, &mut gpio).unwrap() {
            slow_edges += 1;
        }
        assert_eq!(gpio.digital_read(20).unwrap(), fast.level());
        assert_eq!(gpio.digital_read(21).unwrap(), slow.level());
        if slow.level().is_high() {
            slow_high_ms += 1;
        }
    }

    assert_eq!(fast_edges, 200);
    assert_eq!(slow_edges, 100);
    assert_eq!(slow_high_ms, 250);
}

#[test]
fn extreme_duty_cycles_hold_their_level() {
    let time = MockTime::new();
    let mut gpio = Gpio::new(SimulatedGpio::new());

    let mut off = SoftPwm::new(5, PwmConfig::new(100.0, 0.0)).unwrap();
    let mut on = SoftPwm::new(6, PwmConfig::new(100.0, 1.0)).unwrap();
    off.start(&time, &mut gpio).unwrap();
    on.start(&time, &mut gpio).unwrap();

    for _ in 0..100 {
        time.advance_ms(1);
        assert!(!off.poll(&time, &mut gpio).unwrap());
        assert!(!on.poll(&time, &mut gpio).unwrap());
        assert_eq!(gpio.digital_read(5).unwrap(), Level::Low);
        assert_eq!(gpio.digital_read(6).unwrap(), Level::High);
    }

    on.stop(&mut gpio).unwrap();
    assert_eq!(gpio.digital_read(6).unwrap(), Level::Low);
}
