//! Device and Interface Constants.
//!
//! This module defines fixed properties of the host and device interfaces. It includes:
//! 1. **Data Bus:** Width of the shared data bus and its byte-lane structure.
//! 2. **Address Pins:** The auto-precharge/all-banks pin and the address pin budget.
//! 3. **Geometry Limits:** Bounds on bank, row, and column widths the pin budget allows.
//! 4. **Time Base:** Conversion constants for nanosecond timing grades.

/// Width of the device data bus in bits.
pub const DATA_BITS: u32 = 32;

/// Number of low address bits selecting the byte lane within a word.
pub const LANE_BITS: u32 = (DATA_BITS / 8).trailing_zeros();

/// Width of the host byte address with the default geometry.
pub const HOST_ADDRESS_BITS: u32 = 23;

/// Address pin that selects auto-precharge on Read/Write and all banks on Precharge.
pub const AUTO_PRECHARGE_BIT: u32 = 10;

/// Byte mask with every lane masked off (DQM high on all lanes).
pub const DQM_ALL_MASKED: u8 = 0b1111;

/// Maximum bank address width (BA0/BA1).
pub const MAX_BANK_BITS: u32 = 2;

/// Minimum row address width; A10 must exist for auto-precharge.
pub const MIN_ROW_BITS: u32 = AUTO_PRECHARGE_BIT + 1;

/// Maximum row address width (A0-A12).
pub const MAX_ROW_BITS: u32 = 13;

/// Minimum column address width.
pub const MIN_COLUMN_BITS: u32 = 1;

/// Maximum column address width; columns must stay below A10.
pub const MAX_COLUMN_BITS: u32 = AUTO_PRECHARGE_BIT;

/// Nanoseconds per second, used to convert timing grades into cycles.
pub const NS_PER_SECOND: u64 = 1_000_000_000;
