//! SDRAM controller.
//!
//! This module wires the controller's clocked components together. It provides:
//! 1. **Power-on timer:** gates configuration until the power-up delay has elapsed.
//! 2. **Refresh scheduler:** raises `RefreshNeed` once per refresh interval.
//! 3. **Sequencer:** the state machine that issues device commands and owns the data path.
//! 4. **Statistics:** per-state cycle counts, operation counts, and refresh latency.
//!
//! Every component is a register stage. [`Controller::tick`] samples all registered outputs
//! first, then steps each component, so no component observes another's next-state value in the
//! same tick.

/// Device command encoding and the mode register word.
pub mod command;
/// Request latch, bus direction, and read capture.
pub mod datapath;
/// Power-up delay timer.
pub mod power_on;
/// Refresh interval counter.
pub mod refresh;
/// Command sequencer state machine.
pub mod sequencer;
/// Host and device pin bundles.
pub mod signals;

use tracing::{debug, info};

use crate::common::addr::AddressMap;
use crate::common::error::ConfigError;
use crate::config::Config;
use crate::stats::ControllerStats;
use crate::timing::TimingParameters;

use self::power_on::PowerOnTimer;
use self::refresh::RefreshScheduler;
use self::sequencer::{ControllerState, Sequencer, SequencerInputs, TickReport};
use self::signals::{DeviceBus, HostInputs, HostOutputs};

/// A single-byte SDRAM controller driven one clock tick at a time.
#[derive(Clone, Debug)]
pub struct Controller {
    timing: TimingParameters,
    map: AddressMap,
    power_on: PowerOnTimer,
    refresh: RefreshScheduler,
    sequencer: Sequencer,
    stats: ControllerStats,
    cycle: u64,
}

impl Controller {
    /// Builds a controller in its reset state.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the timing grade or geometry is invalid.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let timing = TimingParameters::from_config(config)?;
        let map = AddressMap::new(&config.geometry)?;
        info!(
            clock_hz = config.clock.frequency_hz,
            capacity = map.capacity_bytes(),
            refresh_interval = timing.refresh_interval_cycles(),
            "controller created"
        );
        Ok(Self {
            timing,
            map,
            power_on: PowerOnTimer::new(timing.init_delay_cycles()),
            refresh: RefreshScheduler::new(&timing),
            sequencer: Sequencer::new(timing, map),
            stats: ControllerStats::default(),
            cycle: 0,
        })
    }

    /// Advances one clock tick.
    ///
    /// `dq` is the value present on the data bus during this tick (the device's output, or the
    /// controller's own drive value while writing).
    pub fn tick(&mut self, host: &HostInputs, dq: u32) -> TickReport {
        self.cycle += 1;

        if host.reset {
            self.reset();
            self.stats.record_reset();
            return TickReport::default();
        }

        let inputs = SequencerInputs {
            host: *host,
            config_ready: self.power_on.pulse(),
            refresh_needed: self.refresh.need(),
            refresh_urgent: self.refresh.urgent(),
        };
        let state = self.sequencer.state();

        let report = self.sequencer.step(&inputs, dq);
        self.power_on.tick();
        self.refresh
            .tick(state.is_initialized(), report.refresh_executed());

        self.stats
            .record_tick(self.cycle, state, &report, self.refresh.need());
        report
    }

    fn reset(&mut self) {
        debug!(cycle = self.cycle, "controller reset");
        self.power_on.reset();
        self.refresh.reset();
        self.sequencer.reset();
    }

    /// Registered host outputs.
    pub fn outputs(&self) -> HostOutputs {
        let datapath = self.sequencer.datapath();
        HostOutputs {
            read_byte: datapath.read_byte(),
            read_word: datapath.read_word(),
            data_ready: datapath.data_ready(),
            busy: self.sequencer.busy(),
        }
    }

    /// Device pins registered for the next tick.
    pub const fn bus(&self) -> &DeviceBus {
        self.sequencer.bus()
    }

    /// Current sequencer state.
    pub const fn state(&self) -> ControllerState {
        self.sequencer.state()
    }

    /// Ticks since the current state was entered.
    pub const fn state_cycle(&self) -> u32 {
        self.sequencer.cycle()
    }

    /// Derived cycle counts.
    pub const fn timing(&self) -> &TimingParameters {
        &self.timing
    }

    /// Host address decomposition.
    pub const fn address_map(&self) -> &AddressMap {
        &self.map
    }

    /// The refresh scheduler.
    pub const fn refresh_scheduler(&self) -> &RefreshScheduler {
        &self.refresh
    }

    /// The power-on timer.
    pub const fn power_on_timer(&self) -> &PowerOnTimer {
        &self.power_on
    }

    /// Counters collected since construction.
    pub const fn stats(&self) -> &ControllerStats {
        &self.stats
    }

    /// Ticks since construction, including reset ticks.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }
}
