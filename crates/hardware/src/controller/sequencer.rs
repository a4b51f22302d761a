//! Command sequencer (core state machine).
//!
//! The sequencer walks `Init -> Config -> Idle -> {Read | Write | Refresh} -> Idle`, issuing at
//! most one device command per tick. Every action is keyed by `(state, cycle)`, where `cycle`
//! counts ticks since the state was entered:
//!
//! | State   | Cycle                          | Action                                   |
//! |---------|--------------------------------|------------------------------------------|
//! | Config  | 0                              | Precharge-All                            |
//! | Config  | tRP                            | Auto-Refresh                             |
//! | Config  | tRP + tRC                      | Auto-Refresh                             |
//! | Config  | tRP + 2 tRC                    | Set-Mode-Register                        |
//! | Config  | tRP + 2 tRC + tMRD             | -> Idle                                  |
//! | Read    | tRCD                           | Read with auto-precharge                 |
//! | Read    | tRCD + CL + 1                  | latch word/byte, pulse data_ready, -> Idle |
//! | Write   | tRCD                           | Write with auto-precharge, drive data    |
//! | Write   | tRCD + tWR + tRP + 1           | -> Idle                                  |
//! | Refresh | tRC                            | -> Idle                                  |
//!
//! Idle accepts a read (preferred), then a write, then a due or forced refresh. An urgent
//! refresh is served before any host request.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::common::addr::{AddressMap, ByteAddr};
use crate::common::constants::AUTO_PRECHARGE_BIT;
use crate::controller::command::{Command, ModeRegister};
use crate::controller::datapath::{DataPath, PendingRequest};
use crate::controller::signals::{DeviceBus, HostInputs};
use crate::timing::TimingParameters;

/// Sequencer state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ControllerState {
    /// Waiting for the power-up delay.
    #[default]
    Init,
    /// Running the device initialization sequence.
    Config,
    /// Ready for a request.
    Idle,
    /// Performing a single-byte read.
    Read,
    /// Performing a single-byte write.
    Write,
    /// Performing an auto-refresh.
    Refresh,
}

impl ControllerState {
    /// Returns `true` once power-up configuration has completed.
    pub const fn is_initialized(self) -> bool {
        !matches!(self, Self::Init | Self::Config)
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Config => "config",
            Self::Idle => "idle",
            Self::Read => "read",
            Self::Write => "write",
            Self::Refresh => "refresh",
        };
        f.pad(name)
    }
}

/// Saturating count of ticks since the current state was entered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleCounter(u32);

impl CycleCounter {
    /// Current count.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Restarts at zero.
    pub const fn reset(&mut self) {
        self.0 = 0;
    }

    /// Counts one tick, saturating at `u32::MAX`.
    pub const fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }
}

/// What caused a refresh to be issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum RefreshCause {
    /// The scheduler flagged `RefreshNeed` and the controller was idle.
    Scheduled,
    /// The host asserted `refresh`.
    Forced,
    /// A due refresh preempted a host request.
    Urgent,
}

/// Kind of host operation accepted from Idle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Operation {
    /// Single-byte read.
    Read,
    /// Single-byte write.
    Write,
}

/// Registered signals from the timers, sampled by the sequencer at the start of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequencerInputs {
    /// Host request lines.
    pub host: HostInputs,
    /// Power-on timer's one-shot pulse.
    pub config_ready: bool,
    /// Scheduler's `RefreshNeed` flag.
    pub refresh_needed: bool,
    /// Scheduler's urgency flag.
    pub refresh_urgent: bool,
}

/// Events produced by one sequencer tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// A host operation was accepted.
    pub accepted: Option<Operation>,
    /// An Auto-Refresh was issued from Idle ("refresh executed" pulse).
    pub refresh: Option<RefreshCause>,
    /// A host operation finished.
    pub completed: Option<Operation>,
    /// A host request was asserted but not accepted.
    pub ignored_request: bool,
}

impl TickReport {
    /// The one-tick "refresh executed" pulse consumed by the scheduler.
    pub const fn refresh_executed(&self) -> bool {
        self.refresh.is_some()
    }
}

/// The command sequencer and the data path it owns.
#[derive(Clone, Debug)]
pub struct Sequencer {
    timing: TimingParameters,
    map: AddressMap,
    state: ControllerState,
    cycle: CycleCounter,
    bus: DeviceBus,
    datapath: DataPath,
}

impl Sequencer {
    /// Creates a sequencer in Init.
    pub fn new(timing: TimingParameters, map: AddressMap) -> Self {
        Self {
            timing,
            map,
            state: ControllerState::Init,
            cycle: CycleCounter::default(),
            bus: DeviceBus::nop(),
            datapath: DataPath::new(),
        }
    }

    /// Forces Init: abandons any operation, releases the bus, and clears `data_ready`.
    pub fn reset(&mut self) {
        if self.state != ControllerState::Init {
            debug!(from = %self.state, "reset");
        }
        self.state = ControllerState::Init;
        self.cycle.reset();
        self.bus = DeviceBus::nop();
        self.datapath.reset();
    }

    /// Advances one tick.
    ///
    /// `dq` is the value on the data bus during this tick; it enters the capture register and
    /// becomes visible to the state machine on the next tick.
    pub fn step(&mut self, inputs: &SequencerInputs, dq: u32) -> TickReport {
        let mut bus = DeviceBus::nop();
        let mut report = TickReport::default();
        self.datapath.begin_tick();

        let next = match self.state {
            ControllerState::Init => {
                if inputs.config_ready {
                    ControllerState::Config
                } else {
                    ControllerState::Init
                }
            }
            ControllerState::Config => self.config_step(&mut bus),
            ControllerState::Idle => self.idle_step(inputs, &mut bus, &mut report),
            ControllerState::Read => self.read_step(&mut bus, &mut report),
            ControllerState::Write => self.write_step(&mut bus, &mut report),
            ControllerState::Refresh => {
                if self.cycle.get() == self.timing.refresh_complete_at() {
                    ControllerState::Idle
                } else {
                    ControllerState::Refresh
                }
            }
        };

        if self.state != ControllerState::Idle && inputs.host.has_request() {
            report.ignored_request = true;
        }

        self.datapath.capture(dq);

        if bus.command != Command::Nop {
            trace!(
                state = %self.state,
                cycle = self.cycle.get(),
                command = %bus.command,
                bank = bus.bank,
                address = bus.address,
                "issue"
            );
        }

        if next == self.state {
            self.cycle.advance();
        } else {
            debug!(from = %self.state, to = %next, cycle = self.cycle.get(), "transition");
            self.state = next;
            self.cycle.reset();
        }
        self.bus = bus;
        report
    }

    fn config_step(&self, bus: &mut DeviceBus) -> ControllerState {
        let offsets = self.timing.config_offsets();
        match self.cycle.get() {
            0 => {
                bus.command = Command::Precharge;
                bus.address = 1 << AUTO_PRECHARGE_BIT;
            }
            c if c == offsets.first_refresh || c == offsets.second_refresh => {
                bus.command = Command::AutoRefresh;
            }
            c if c == offsets.mode_register => {
                bus.command = Command::ModeRegisterSet;
                bus.address = ModeRegister::single_access(self.timing.cas_latency()).encode();
                bus.bank = 0;
            }
            c if c == offsets.ready => {
                info!("initialization complete");
                return ControllerState::Idle;
            }
            _ => {}
        }
        ControllerState::Config
    }

    fn idle_step(
        &mut self,
        inputs: &SequencerInputs,
        bus: &mut DeviceBus,
        report: &mut TickReport,
    ) -> ControllerState {
        let host = &inputs.host;

        if inputs.refresh_urgent {
            if host.read || host.write {
                debug!(address = host.address, "urgent refresh preempts host request");
                report.ignored_request = true;
            }
            return Self::issue_refresh(bus, report, RefreshCause::Urgent);
        }

        if host.read || host.write {
            let request = PendingRequest {
                address: self.map.mask(ByteAddr::new(host.address)),
                write_data: host.write_data,
                is_write: !host.read,
            };
            let fields = self.map.decode(request.address);
            bus.command = Command::Activate;
            bus.address = fields.row;
            bus.bank = fields.bank;
            self.datapath.latch(request);

            return if request.is_write {
                report.accepted = Some(Operation::Write);
                ControllerState::Write
            } else {
                report.accepted = Some(Operation::Read);
                ControllerState::Read
            };
        }

        if inputs.refresh_needed {
            return Self::issue_refresh(bus, report, RefreshCause::Scheduled);
        }
        if host.refresh {
            return Self::issue_refresh(bus, report, RefreshCause::Forced);
        }
        ControllerState::Idle
    }

    fn issue_refresh(
        bus: &mut DeviceBus,
        report: &mut TickReport,
        cause: RefreshCause,
    ) -> ControllerState {
        bus.command = Command::AutoRefresh;
        report.refresh = Some(cause);
        ControllerState::Refresh
    }

    fn read_step(&mut self, bus: &mut DeviceBus, report: &mut TickReport) -> ControllerState {
        let Some(request) = self.datapath.pending() else {
            return ControllerState::Idle;
        };
        let cycle = self.cycle.get();

        if cycle == self.timing.activate_to_rw() {
            let fields = self.map.decode(request.address);
            bus.command = Command::Read;
            bus.address = self.map.column_pins(fields.column);
            bus.bank = fields.bank;
            self.datapath.select_lane(fields.lane);
        } else if cycle == self.timing.read_complete_at() {
            self.datapath.complete_read();
            self.datapath.release();
            report.completed = Some(Operation::Read);
            return ControllerState::Idle;
        }
        ControllerState::Read
    }

    fn write_step(&mut self, bus: &mut DeviceBus, report: &mut TickReport) -> ControllerState {
        let Some(request) = self.datapath.pending() else {
            return ControllerState::Idle;
        };
        let cycle = self.cycle.get();

        if cycle == self.timing.activate_to_rw() {
            let fields = self.map.decode(request.address);
            bus.command = Command::Write;
            bus.address = self.map.column_pins(fields.column);
            bus.bank = fields.bank;
            self.datapath
                .drive_write(bus, fields.lane, request.write_data);
        } else if cycle == self.timing.write_complete_at() {
            self.datapath.release();
            report.completed = Some(Operation::Write);
            return ControllerState::Idle;
        }
        ControllerState::Write
    }

    /// Current state.
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Ticks since the current state was entered.
    pub const fn cycle(&self) -> u32 {
        self.cycle.get()
    }

    /// Pins driven during the next tick.
    pub const fn bus(&self) -> &DeviceBus {
        &self.bus
    }

    /// The data path (request latch and read outputs).
    pub const fn datapath(&self) -> &DataPath {
        &self.datapath
    }

    /// Returns `true` unless the sequencer is Idle.
    pub fn busy(&self) -> bool {
        self.state != ControllerState::Idle
    }
}
