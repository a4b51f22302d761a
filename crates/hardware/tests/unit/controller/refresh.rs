//! Refresh Scheduler Unit Tests.
//!
//! Uses the fast grade: interval 200, counter cap 398, urgent threshold 387.

use sdramctl_core::controller::refresh::RefreshScheduler;
use sdramctl_core::timing::TimingParameters;

use crate::common::harness::fast_config;

fn scheduler() -> RefreshScheduler {
    let timing = TimingParameters::from_config(&fast_config()).unwrap();
    RefreshScheduler::new(&timing)
}

fn run(scheduler: &mut RefreshScheduler, ticks: u32) {
    for _ in 0..ticks {
        scheduler.tick(true, false);
    }
}

#[test]
fn need_rises_after_one_interval() {
    let mut s = scheduler();
    run(&mut s, 199);
    assert!(!s.need());
    run(&mut s, 1);
    assert!(s.need());
    assert_eq!(s.counter(), 200);
}

#[test]
fn counter_holds_while_not_running() {
    let mut s = scheduler();
    for _ in 0..1000 {
        s.tick(false, false);
    }
    assert_eq!(s.counter(), 0);
    assert!(!s.need());
}

#[test]
fn executed_refresh_subtracts_one_interval() {
    let mut s = scheduler();
    run(&mut s, 250);
    assert!(s.need());

    s.tick(true, true);
    assert!(!s.need());
    assert_eq!(s.counter(), 51);

    // The deferred 50 cycles are not lost: the next need arrives 149 ticks later.
    run(&mut s, 148);
    assert!(!s.need());
    run(&mut s, 1);
    assert!(s.need());
}

#[test]
fn counter_saturates_at_cap() {
    let mut s = scheduler();
    run(&mut s, 10_000);
    assert_eq!(s.counter(), 398);
    assert!(s.urgent());
}

#[test]
fn urgency_threshold() {
    let mut s = scheduler();
    run(&mut s, 386);
    assert!(s.need());
    assert!(!s.urgent());
    run(&mut s, 1);
    assert!(s.urgent());
}

#[test]
fn reset_clears_counter_and_need() {
    let mut s = scheduler();
    run(&mut s, 300);
    s.reset();
    assert_eq!(s.counter(), 0);
    assert!(!s.need());
    assert_eq!(s.interval(), 200);
}
