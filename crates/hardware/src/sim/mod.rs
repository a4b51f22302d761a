//! Simulation collaborators.
//!
//! Provides a behavioral SDRAM device and a testbench that clocks it against the controller.

/// Behavioral SDRAM device model.
pub mod device;
/// Controller-plus-device testbench.
pub mod testbench;
