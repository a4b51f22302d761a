//! Controller component tests.

/// Data path register behavior.
pub mod datapath;
/// Power-on timer.
pub mod power_on;
/// Refresh scheduler.
pub mod refresh;
