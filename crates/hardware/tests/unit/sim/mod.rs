//! Simulation collaborator tests.

/// Behavioral device model.
pub mod device;
