//! Error definitions.
//!
//! This module defines the error taxonomy of the controller and its simulation collaborators. It provides:
//! 1. **Construction Errors:** `ConfigError` for invalid clock, geometry, or timing grades; raised
//!    before the controller ever ticks.
//! 2. **Device Errors:** `DeviceError` for command-protocol and timing breaches observed by the
//!    behavioral device model.
//! 3. **Simulation Errors:** `SimError` for testbench runs (device errors and timeouts).
//!
//! Host protocol violations (requests while busy, simultaneous read and write) are not errors;
//! the sequencer resolves them deterministically.

use thiserror::Error;

use crate::controller::command::Command;

/// Construction-time contract violations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The controller clock frequency is zero.
    #[error("clock frequency must be non-zero")]
    ZeroClock,

    /// A timing parameter derives to zero cycles.
    #[error("timing parameter `{name}` derives to zero cycles")]
    ZeroCycles {
        /// Parameter name.
        name: &'static str,
    },

    /// A timing parameter does not fit the cycle counter.
    #[error("timing parameter `{name}` derives to {cycles} cycles, beyond the counter range")]
    CycleOverflow {
        /// Parameter name.
        name: &'static str,
        /// Derived cycle count.
        cycles: u64,
    },

    /// The CAS latency cannot be encoded in the mode register.
    #[error("CAS latency {0} is not supported (expected 2 or 3)")]
    UnsupportedCasLatency(u32),

    /// An address field width does not fit the device pin budget.
    #[error("{field} = {bits} is outside the supported range {min}..={max}")]
    GeometryOutOfRange {
        /// Geometry field name.
        field: &'static str,
        /// Configured width.
        bits: u32,
        /// Smallest accepted width.
        min: u32,
        /// Largest accepted width.
        max: u32,
    },

    /// The refresh interval is too short to complete a refresh between operations.
    #[error(
        "refresh interval of {interval} cycles cannot accommodate a {longest}-cycle operation"
    )]
    RefreshIntervalTooShort {
        /// Refresh interval in cycles.
        interval: u32,
        /// Longest controller operation in cycles.
        longest: u32,
    },

    /// The power-up delay is shorter than an operation a reset may interrupt.
    #[error(
        "init delay of {init} cycles is shorter than the longest {longest}-cycle operation"
    )]
    InitDelayTooShort {
        /// Power-up delay in cycles.
        init: u32,
        /// Longest controller operation in cycles.
        longest: u32,
    },

    /// Two timing parameters contradict the fixed command offsets.
    #[error("inconsistent timing: {0}")]
    InconsistentTiming(&'static str),

    /// The configuration document could not be parsed.
    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Command-protocol and timing breaches detected by the device model.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// A command that needs an initialized device arrived before the mode register was set.
    #[error("cycle {cycle}: {command} issued before initialization completed")]
    NotInitialized {
        /// Device cycle.
        cycle: u64,
        /// Offending command.
        command: Command,
    },

    /// A command arrived while the device was still refreshing or loading the mode register.
    #[error("cycle {cycle}: {command} issued while the device is busy until cycle {ready_at}")]
    DeviceBusy {
        /// Device cycle.
        cycle: u64,
        /// Offending command.
        command: Command,
        /// First cycle at which the device accepts commands again.
        ready_at: u64,
    },

    /// Bank-Activate to a bank that is still precharging.
    #[error("cycle {cycle}: bank {bank} activated before precharge completes at cycle {ready_at}")]
    BankPrecharging {
        /// Device cycle.
        cycle: u64,
        /// Bank index.
        bank: u8,
        /// First cycle at which the bank may be activated.
        ready_at: u64,
    },

    /// Bank-Activate to a bank that already has an open row.
    #[error("cycle {cycle}: bank {bank} already has row {row} open")]
    RowAlreadyOpen {
        /// Device cycle.
        cycle: u64,
        /// Bank index.
        bank: u8,
        /// Currently open row.
        row: u16,
    },

    /// Read or Write to a bank with no open row.
    #[error("cycle {cycle}: {command} to bank {bank} with no open row")]
    RowNotOpen {
        /// Device cycle.
        cycle: u64,
        /// Offending command.
        command: Command,
        /// Bank index.
        bank: u8,
    },

    /// Read or Write issued before the activate-to-read/write delay elapsed.
    #[error("cycle {cycle}: {command} to bank {bank} after {elapsed} cycles, tRCD is {required}")]
    ActivateToAccess {
        /// Device cycle.
        cycle: u64,
        /// Offending command.
        command: Command,
        /// Bank index.
        bank: u8,
        /// Cycles since the bank was activated.
        elapsed: u64,
        /// Required activate-to-read/write delay.
        required: u64,
    },

    /// Auto-Refresh or Set-Mode-Register while a bank is open or precharging.
    #[error("cycle {cycle}: {command} requires all banks idle, bank {bank} is not")]
    BanksNotIdle {
        /// Device cycle.
        cycle: u64,
        /// Offending command.
        command: Command,
        /// First non-idle bank.
        bank: u8,
    },

    /// The mode register word selects a mode the device model does not implement.
    #[error("cycle {cycle}: unsupported mode register value {bits:#05x}")]
    UnsupportedMode {
        /// Device cycle.
        cycle: u64,
        /// Raw mode register bits.
        bits: u16,
    },

    /// Controller and device drove the data bus in the same cycle.
    #[error("cycle {cycle}: data bus contention")]
    BusContention {
        /// Device cycle.
        cycle: u64,
    },
}

/// Errors raised while running a controller against the device model.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SimError {
    /// The device model rejected the command stream.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// A host-level operation did not complete in time.
    #[error("{operation} did not complete within {cycles} cycles")]
    Timeout {
        /// Operation being waited on.
        operation: &'static str,
        /// Cycle budget that was exhausted.
        cycles: u64,
    },
}
