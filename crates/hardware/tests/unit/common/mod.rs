//! Shared type tests.

/// Address decoding and byte lanes.
pub mod addr;
