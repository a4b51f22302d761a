//! Refresh scheduler.
//!
//! A saturating counter that raises `RefreshNeed` once per refresh interval. Executing a refresh
//! subtracts one interval instead of clearing the counter, so a deferred refresh does not push
//! the following ones later. The counter saturates at `2 * interval - 2`.
//!
//! A due refresh that has waited close to that cap becomes *urgent*; the sequencer then serves it
//! ahead of host requests, which bounds the due-to-executed latency to one interval even under
//! continuous host traffic.

use tracing::debug;

use crate::timing::TimingParameters;

/// Free-running refresh interval counter.
#[derive(Clone, Debug)]
pub struct RefreshScheduler {
    interval: u32,
    cap: u32,
    urgent_threshold: u32,
    counter: u32,
    need: bool,
}

impl RefreshScheduler {
    /// Creates a scheduler for the given timing table.
    pub const fn new(timing: &TimingParameters) -> Self {
        Self {
            interval: timing.refresh_interval_cycles(),
            cap: timing.refresh_counter_cap(),
            urgent_threshold: timing.urgent_refresh_threshold(),
            counter: 0,
            need: false,
        }
    }

    /// Clears the counter and any pending need.
    pub const fn reset(&mut self) {
        self.counter = 0;
        self.need = false;
    }

    /// Advances one tick.
    ///
    /// `running` is false while the controller is in Init or Config; the counter holds then.
    /// `executed` is the sequencer's one-tick "refresh executed" pulse for this tick.
    pub fn tick(&mut self, running: bool, executed: bool) {
        let mut next = if running {
            (self.counter + 1).min(self.cap)
        } else {
            self.counter
        };

        if executed {
            next = next.saturating_sub(self.interval);
            self.need = false;
        } else if !self.need && next >= self.interval {
            self.need = true;
            debug!(counter = next, "refresh due");
        }
        self.counter = next;
    }

    /// `RefreshNeed`: a scheduled refresh is due.
    pub const fn need(&self) -> bool {
        self.need
    }

    /// A due refresh has waited long enough to preempt host requests.
    pub const fn urgent(&self) -> bool {
        self.need && self.counter >= self.urgent_threshold
    }

    /// Current counter value.
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// Refresh interval in cycles.
    pub const fn interval(&self) -> u32 {
        self.interval
    }
}
