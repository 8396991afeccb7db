use rpi_toolkit::{MockTime, TimeSource, Timer};

/// Two timers sharing one 1 ms polling loop, as a blink + sensor program does
#[test]
fn blink_and_sensor_timers_share_a_loop() {
    let time = MockTime::new();
    let mut blink = Timer::new();
    let mut sensor = Timer::new();
    blink.set(&time, 500);
    sensor.set(&time, 100);

    let mut blinks = 0;
    let mut reads = 0;
    while time.now_ms() < 5000 {
        time.advance_ms(1);
        if blink.tick(&time) {
            blinks += 1;
        }
        if sensor.tick(&time) {
            reads += 1;
        }
    }

    assert_eq!(blinks, 10);
    assert_eq!(reads, 50);
    assert_eq!(blink.next_expiry(), 5500);
    assert_eq!(sensor.next_expiry(), 5100);
}

#[test]
fn stalled_loop_catches_up_one_firing_per_poll() {
    let time = MockTime::new();
    let mut timer = Timer::new();
    timer.set(&time, 100);

    time.advance_ms(1050);
    let mut firings = 0;
    while timer.tick(&time) {
        firings += 1;
        assert!(firings <= 10, "catch-up never ends");
    }

    assert_eq!(firings, 10);
    assert_eq!(timer.next_expiry(), 1100);
    assert!(!timer.expired(&time));
}

#[test]
fn jittery_polling_does_not_drift() {
    let time = MockTime::new();
    let mut timer = Timer::new();
    timer.set(&time, 20);

    // Poll late by a varying 0..=7 ms each round
    let mut fired_at = Vec::new();
    for round in 0..50u64 {
        time.set((round * 20 + 20 + round % 8) * 1000);
        if timer.tick(&time) {
            fired_at.push(time.now_ms());
        }
    }

    assert_eq!(fired_at.len(), 50);
    assert_eq!(timer.next_expiry(), 20 * 51);
}

#[test]
fn timer_starting_near_wraparound() {
    let start_ms = u64::MAX - 150;
    let mut timer = Timer::new();
    timer.set_at(start_ms, 100);

    assert!(!timer.expired_at(start_ms + 99));
    assert!(timer.tick_at(start_ms + 100));
    // The next deadline wraps past zero
    assert!(!timer.expired_at(start_ms + 149));
    assert!(!timer.expired_at(start_ms.wrapping_add(199)));
    assert!(timer.tick_at(start_ms.wrapping_add(200)));
}
