//! Shared test infrastructure.

/// Test configurations and the `TestContext` harness.
pub mod harness;
