//! Power-on / reset delay timer.
//!
//! Counts cycles after reset until the device's power-up delay has elapsed, then raises a
//! single-tick "configuration ready" pulse. The count holds at the threshold afterwards, so the
//! pulse fires exactly once per reset.

/// Delay line that gates the start of device configuration.
#[derive(Clone, Debug)]
pub struct PowerOnTimer {
    threshold: u32,
    elapsed: u32,
    pulse: bool,
}

impl PowerOnTimer {
    /// Creates a timer that fires after `threshold` ticks.
    pub const fn new(threshold: u32) -> Self {
        Self {
            threshold,
            elapsed: 0,
            pulse: false,
        }
    }

    /// Returns the timer to its power-up state.
    pub const fn reset(&mut self) {
        self.elapsed = 0;
        self.pulse = false;
    }

    /// Advances one tick.
    ///
    /// The pulse is registered on the tick the count reaches the threshold and cleared on the
    /// next one.
    pub const fn tick(&mut self) {
        if self.elapsed < self.threshold {
            self.elapsed += 1;
            self.pulse = self.elapsed == self.threshold;
        } else {
            self.pulse = false;
        }
    }

    /// The registered one-shot "configuration ready" pulse.
    pub const fn pulse(&self) -> bool {
        self.pulse
    }

    /// Cycles counted since reset, saturating at the threshold.
    pub const fn elapsed(&self) -> u32 {
        self.elapsed
    }

    /// Returns `true` once the delay has fully elapsed.
    pub const fn expired(&self) -> bool {
        self.elapsed >= self.threshold
    }
}
