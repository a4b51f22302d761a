//! Common utilities and types used throughout the controller.
//!
//! This module provides building blocks shared by the controller, the device model, and the CLI.
//! It includes:
//! 1. **Address Types:** Host byte addresses, byte lanes, and bank/row/column decoding.
//! 2. **Constants:** Bus widths, pin assignments, and geometry limits.
//! 3. **Error Handling:** Construction, device-model, and simulation error types.

/// Host address types and bank/row/column decoding.
pub mod addr;

/// Device and interface constants.
pub mod constants;

/// Error types.
pub mod error;

pub use addr::{AddressMap, ByteAddr, ByteLane, DecodedAddr};
pub use error::{ConfigError, DeviceError, SimError};
