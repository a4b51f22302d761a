//! Controller-plus-device testbench.
//!
//! Wires a [`Controller`] to an [`SdramModel`] one tick at a time and offers host-level helpers
//! (byte writes and reads, forced refreshes) that hide the request handshake.
//!
//! Each [`Testbench::step`] presents the pins the controller registered on the previous tick to
//! the device, resolves the data bus (the controller's drive value while it writes, otherwise the
//! device's output), and clocks the controller with that value.

use serde::Serialize;

use crate::common::addr::ByteAddr;
use crate::common::error::{ConfigError, SimError};
use crate::config::Config;
use crate::controller::Controller;
use crate::controller::command::Command;
use crate::controller::sequencer::{Operation, TickReport};
use crate::controller::signals::HostInputs;
use crate::sim::device::SdramModel;

/// One non-NOP command observed on the device pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    /// Bench tick on which the device processed the command.
    pub cycle: u64,
    /// Command mnemonic.
    pub command: Command,
    /// Bank pins.
    pub bank: u8,
    /// Address pins.
    pub address: u16,
    /// Byte mask.
    pub dqm: u8,
    /// Word driven by the controller, if any.
    pub dq: Option<u32>,
}

/// Result of a single-byte read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadResult {
    /// Selected byte.
    pub byte: u8,
    /// Full word containing it.
    pub word: u32,
}

/// A controller and a device model clocked together.
#[derive(Debug)]
pub struct Testbench {
    controller: Controller,
    device: SdramModel,
    trace: Option<Vec<TraceEntry>>,
    budget: u64,
}

impl Testbench {
    /// Builds a testbench; the command trace is recorded when `config.trace.commands` is set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the controller rejects the configuration.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let controller = Controller::new(config)?;
        let timing = *controller.timing();
        let device = SdramModel::new(timing, *controller.address_map());
        let budget = timing.startup_cycles()
            + 2 * timing.refresh_interval_cycles() as u64
            + 4 * timing.longest_operation_cycles() as u64;
        Ok(Self {
            controller,
            device,
            trace: config.trace.commands.then(Vec::new),
            budget,
        })
    }

    /// Clocks the controller and the device once.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Device`] if the device model rejects the command on its pins.
    pub fn step(&mut self, host: &HostInputs) -> Result<TickReport, SimError> {
        let bus = *self.controller.bus();
        let driven = self.device.clock(&bus)?;

        if bus.command != Command::Nop {
            if let Some(trace) = self.trace.as_mut() {
                trace.push(TraceEntry {
                    cycle: self.device.cycle(),
                    command: bus.command,
                    bank: bus.bank,
                    address: bus.address,
                    dqm: bus.dqm,
                    dq: bus.is_driving().then_some(bus.dq_out),
                });
            }
        }

        let dq = if bus.is_driving() {
            bus.dq_out
        } else {
            driven.unwrap_or(0)
        };
        Ok(self.controller.tick(host, dq))
    }

    /// Runs `cycles` ticks with no host request.
    ///
    /// # Errors
    ///
    /// Returns the first device error.
    pub fn run(&mut self, cycles: u64) -> Result<(), SimError> {
        for _ in 0..cycles {
            let _ = self.step(&HostInputs::idle())?;
        }
        Ok(())
    }

    /// Asserts reset for one tick.
    ///
    /// # Errors
    ///
    /// Returns the device error raised on that tick, if any.
    pub fn reset(&mut self) -> Result<(), SimError> {
        let _ = self.step(&HostInputs::reset())?;
        Ok(())
    }

    /// Ticks until the controller is not busy.
    ///
    /// # Returns
    ///
    /// The number of ticks waited.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Timeout`] if the controller stays busy past the cycle budget.
    pub fn wait_ready(&mut self) -> Result<u64, SimError> {
        let mut waited = 0;
        while self.controller.outputs().busy {
            if waited >= self.budget {
                return Err(SimError::Timeout {
                    operation: "ready",
                    cycles: self.budget,
                });
            }
            let _ = self.step(&HostInputs::idle())?;
            waited += 1;
        }
        Ok(waited)
    }

    /// Presents `request` until the controller accepts it, then ticks until it completes.
    fn transact(
        &mut self,
        request: &HostInputs,
        operation: Operation,
        name: &'static str,
    ) -> Result<(), SimError> {
        let mut spent = 0;
        loop {
            spent += self.wait_ready()?;
            let report = self.step(request)?;
            spent += 1;
            if report.accepted == Some(operation) {
                break;
            }
            if spent >= self.budget {
                return Err(SimError::Timeout {
                    operation: name,
                    cycles: self.budget,
                });
            }
        }
        for _ in 0..self.budget {
            let report = self.step(&HostInputs::idle())?;
            if report.completed == Some(operation) {
                return Ok(());
            }
        }
        Err(SimError::Timeout {
            operation: name,
            cycles: self.budget,
        })
    }

    /// Writes one byte.
    ///
    /// # Errors
    ///
    /// Returns a device error or a timeout.
    pub fn write_byte(&mut self, addr: u32, data: u8) -> Result<(), SimError> {
        self.transact(&HostInputs::write(addr, data), Operation::Write, "write")
    }

    /// Reads one byte.
    ///
    /// # Errors
    ///
    /// Returns a device error or a timeout.
    pub fn read_byte(&mut self, addr: u32) -> Result<ReadResult, SimError> {
        self.transact(&HostInputs::read(addr), Operation::Read, "read")?;
        let outputs = self.controller.outputs();
        Ok(ReadResult {
            byte: outputs.read_byte,
            word: outputs.read_word,
        })
    }

    /// Reads the full word containing `addr`.
    ///
    /// # Errors
    ///
    /// Returns a device error or a timeout.
    pub fn read_word(&mut self, addr: u32) -> Result<u32, SimError> {
        let aligned = ByteAddr::new(addr).word_aligned();
        Ok(self.read_byte(aligned.val())?.word)
    }

    /// Requests a refresh and waits for it to finish.
    ///
    /// # Errors
    ///
    /// Returns a device error or a timeout.
    pub fn force_refresh(&mut self) -> Result<(), SimError> {
        let mut spent = 0;
        loop {
            spent += self.wait_ready()?;
            let report = self.step(&HostInputs::refresh())?;
            spent += 1;
            if report.refresh_executed() {
                let _ = self.wait_ready()?;
                return Ok(());
            }
            if spent >= self.budget {
                return Err(SimError::Timeout {
                    operation: "refresh",
                    cycles: self.budget,
                });
            }
        }
    }

    /// The controller under test.
    pub const fn controller(&self) -> &Controller {
        &self.controller
    }

    /// The device model.
    pub const fn device(&self) -> &SdramModel {
        &self.device
    }

    /// Mutable access to the device model, for preloading memory.
    pub const fn device_mut(&mut self) -> &mut SdramModel {
        &mut self.device
    }

    /// Commands recorded so far; empty when tracing is disabled.
    pub fn trace(&self) -> &[TraceEntry] {
        self.trace.as_deref().unwrap_or_default()
    }

    /// Cycle budget used by the waiting helpers.
    pub const fn budget(&self) -> u64 {
        self.budget
    }
}
