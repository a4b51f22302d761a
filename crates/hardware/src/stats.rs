//! Controller statistics collection and reporting.
//!
//! This module tracks what the controller spent its cycles on. It provides:
//! 1. **State occupancy:** Ticks spent in each sequencer state.
//! 2. **Operations:** Completed reads and writes, ignored requests, and resets.
//! 3. **Refresh:** Refreshes by cause and the latency from `RefreshNeed` to execution.

use serde::Serialize;

use crate::controller::sequencer::{ControllerState, Operation, RefreshCause, TickReport};

/// Counters updated once per controller tick.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ControllerStats {
    /// Ticks since construction.
    pub cycles: u64,
    /// Ticks spent in Init.
    pub cycles_init: u64,
    /// Ticks spent in Config.
    pub cycles_config: u64,
    /// Ticks spent in Idle.
    pub cycles_idle: u64,
    /// Ticks spent in Read.
    pub cycles_read: u64,
    /// Ticks spent in Write.
    pub cycles_write: u64,
    /// Ticks spent in Refresh.
    pub cycles_refresh: u64,

    /// Reads completed.
    pub reads: u64,
    /// Writes completed.
    pub writes: u64,
    /// Host requests asserted while the controller could not accept them.
    pub ignored_requests: u64,
    /// Ticks with reset asserted.
    pub resets: u64,

    /// Refreshes issued because `RefreshNeed` was set.
    pub refreshes_scheduled: u64,
    /// Refreshes issued on host request.
    pub refreshes_forced: u64,
    /// Refreshes that preempted a host request.
    pub refreshes_urgent: u64,
    /// Sum of due-to-executed latencies, in ticks.
    pub refresh_latency_total: u64,
    /// Longest due-to-executed latency, in ticks.
    pub refresh_latency_max: u64,
    /// Refreshes that were due when executed.
    pub refresh_latency_samples: u64,

    #[serde(skip)]
    due_since: Option<u64>,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"states"`, `"refresh"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "states", "refresh"];

impl ControllerStats {
    /// Records one tick.
    ///
    /// `state` is the state the tick was evaluated in; `refresh_due` is the scheduler's
    /// `RefreshNeed` after the tick.
    pub fn record_tick(
        &mut self,
        cycle: u64,
        state: ControllerState,
        report: &TickReport,
        refresh_due: bool,
    ) {
        self.cycles += 1;
        *self.state_cycles_mut(state) += 1;

        if report.ignored_request {
            self.ignored_requests += 1;
        }
        match report.completed {
            Some(Operation::Read) => self.reads += 1,
            Some(Operation::Write) => self.writes += 1,
            None => {}
        }
        if let Some(cause) = report.refresh {
            match cause {
                RefreshCause::Scheduled => self.refreshes_scheduled += 1,
                RefreshCause::Forced => self.refreshes_forced += 1,
                RefreshCause::Urgent => self.refreshes_urgent += 1,
            }
            if let Some(since) = self.due_since.take() {
                let latency = cycle - since;
                self.refresh_latency_total += latency;
                self.refresh_latency_max = self.refresh_latency_max.max(latency);
                self.refresh_latency_samples += 1;
            }
        }
        if refresh_due && self.due_since.is_none() {
            self.due_since = Some(cycle);
        }
    }

    /// Records a tick with reset asserted.
    pub fn record_reset(&mut self) {
        self.cycles += 1;
        self.resets += 1;
        self.cycles_init += 1;
        self.due_since = None;
    }

    /// Total refreshes issued from Idle.
    pub const fn refreshes(&self) -> u64 {
        self.refreshes_scheduled + self.refreshes_forced + self.refreshes_urgent
    }

    const fn state_cycles_mut(&mut self, state: ControllerState) -> &mut u64 {
        match state {
            ControllerState::Init => &mut self.cycles_init,
            ControllerState::Config => &mut self.cycles_config,
            ControllerState::Idle => &mut self.cycles_idle,
            ControllerState::Read => &mut self.cycles_read,
            ControllerState::Write => &mut self.cycles_write,
            ControllerState::Refresh => &mut self.cycles_refresh,
        }
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of [`STATS_SECTIONS`]. Pass an empty slice to
    /// print all sections (same as `print()`).
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cyc = self.cycles.max(1) as f64;
        let pct = |n: u64| (n as f64 / cyc) * 100.0;

        if want("summary") {
            println!("\n==========================================================");
            println!("SDRAM CONTROLLER STATISTICS");
            println!("==========================================================");
            println!("sim_cycles               {}", self.cycles);
            println!("ops.read                 {}", self.reads);
            println!("ops.write                {}", self.writes);
            println!("ops.ignored              {}", self.ignored_requests);
            println!("resets                   {}", self.resets);
            println!("----------------------------------------------------------");
        }
        if want("states") {
            println!("STATE OCCUPANCY");
            for (name, count) in [
                ("init", self.cycles_init),
                ("config", self.cycles_config),
                ("idle", self.cycles_idle),
                ("read", self.cycles_read),
                ("write", self.cycles_write),
                ("refresh", self.cycles_refresh),
            ] {
                println!("  cycles.{:<16} {} ({:.2}%)", name, count, pct(count));
            }
            println!("----------------------------------------------------------");
        }
        if want("refresh") {
            let avg = if self.refresh_latency_samples > 0 {
                self.refresh_latency_total as f64 / self.refresh_latency_samples as f64
            } else {
                0.0
            };
            println!("REFRESH");
            println!("  refresh.scheduled      {}", self.refreshes_scheduled);
            println!("  refresh.forced         {}", self.refreshes_forced);
            println!("  refresh.urgent         {}", self.refreshes_urgent);
            println!("  latency.max            {} cycles", self.refresh_latency_max);
            println!("  latency.avg            {avg:.2} cycles");
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
