//! Single-byte SDR SDRAM controller library.
//!
//! This crate implements a cycle-accurate SDRAM command sequencer with the following:
//! 1. **Timing:** Nanosecond timing grades converted into the cycle counts the sequencer uses.
//! 2. **Controller:** Power-on timer, refresh scheduler, command sequencer, and data path.
//! 3. **Device:** A behavioral SDRAM model that checks the command stream against its timing.
//! 4. **Simulation:** A testbench wiring both together, plus statistics collection.

/// Common types and constants (addresses, byte lanes, errors).
pub mod common;
/// Controller configuration (clock, geometry, timing grade, tracing).
pub mod config;
/// The controller (power-on timer, refresh scheduler, sequencer, data path).
pub mod controller;
/// Device model and testbench.
pub mod sim;
/// Controller statistics collection and reporting.
pub mod stats;
/// Cycle-count timing table.
pub mod timing;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// The controller; construct with `Controller::new`.
pub use crate::controller::Controller;
/// Controller and device model clocked together.
pub use crate::sim::testbench::Testbench;
/// Derived cycle counts.
pub use crate::timing::TimingParameters;
