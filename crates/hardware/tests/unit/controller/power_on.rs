//! Power-On Timer Unit Tests.

use sdramctl_core::controller::power_on::PowerOnTimer;

#[test]
fn pulse_fires_once_on_the_threshold_tick() {
    let mut timer = PowerOnTimer::new(3);
    let mut pulses = Vec::new();
    for _ in 0..6 {
        timer.tick();
        pulses.push(timer.pulse());
    }
    assert_eq!(pulses, [false, false, true, false, false, false]);
    assert!(timer.expired());
    assert_eq!(timer.elapsed(), 3);
}

#[test]
fn reset_restarts_the_delay() {
    let mut timer = PowerOnTimer::new(2);
    timer.tick();
    timer.tick();
    assert!(timer.pulse());

    timer.reset();
    assert!(!timer.pulse());
    assert!(!timer.expired());
    timer.tick();
    assert!(!timer.pulse());
    timer.tick();
    assert!(timer.pulse());
}

#[test]
fn single_cycle_delay() {
    let mut timer = PowerOnTimer::new(1);
    assert!(!timer.pulse());
    timer.tick();
    assert!(timer.pulse());
    timer.tick();
    assert!(!timer.pulse());
}
