//! Device command encodings.
//!
//! This module defines the command truth table and the mode register layout. It provides:
//! 1. **Command:** The `{RAS#, CAS#, WE#}` encoding of every command the controller issues.
//! 2. **Mode Register:** Encoding and decoding of the burst-length, burst-type, and CAS-latency
//!    fields loaded by Set-Mode-Register.
//!
//! Both layouts are a compatibility contract with the device data sheet and must stay bit-exact.

use std::fmt;

use serde::Serialize;

/// A device command, encoded as `{RAS#, CAS#, WE#}` with chip select held active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum Command {
    /// Set-Mode-Register (`000`).
    ModeRegisterSet = 0b000,
    /// Auto-Refresh (`001`).
    AutoRefresh = 0b001,
    /// Precharge; all banks when A10 is high (`010`).
    Precharge = 0b010,
    /// Bank-Activate (`011`).
    Activate = 0b011,
    /// Write; auto-precharge when A10 is high (`100`).
    Write = 0b100,
    /// Read; auto-precharge when A10 is high (`101`).
    Read = 0b101,
    /// Burst terminate (`110`); never issued with burst length 1.
    BurstTerminate = 0b110,
    /// No operation (`111`).
    #[default]
    Nop = 0b111,
}

impl Command {
    /// Returns the 3-bit `{RAS#, CAS#, WE#}` encoding.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decodes a 3-bit `{RAS#, CAS#, WE#}` value; bits above bit 2 are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::ModeRegisterSet,
            0b001 => Self::AutoRefresh,
            0b010 => Self::Precharge,
            0b011 => Self::Activate,
            0b100 => Self::Write,
            0b101 => Self::Read,
            0b110 => Self::BurstTerminate,
            _ => Self::Nop,
        }
    }

    /// Level of the RAS# pin.
    #[inline]
    pub const fn ras_n(self) -> bool {
        self.bits() & 0b100 != 0
    }

    /// Level of the CAS# pin.
    #[inline]
    pub const fn cas_n(self) -> bool {
        self.bits() & 0b010 != 0
    }

    /// Level of the WE# pin.
    #[inline]
    pub const fn we_n(self) -> bool {
        self.bits() & 0b001 != 0
    }

    /// Short data-sheet mnemonic.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::ModeRegisterSet => "MRS",
            Self::AutoRefresh => "REF",
            Self::Precharge => "PRE",
            Self::Activate => "ACT",
            Self::Write => "WR",
            Self::Read => "RD",
            Self::BurstTerminate => "BST",
            Self::Nop => "NOP",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.mnemonic())
    }
}

/// Mode register contents programmed during initialization.
///
/// The controller only ever programs burst length 1, sequential bursts, and programmed-length
/// write bursts; the CAS latency is the only variable field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModeRegister {
    cas_latency: u32,
}

impl ModeRegister {
    /// Burst length field, A[2:0] (`000` = 1).
    pub const BURST_LENGTH_1: u16 = 0b000;
    /// Burst type bit position (A3, `0` = sequential).
    pub const BURST_TYPE_BIT: u32 = 3;
    /// CAS latency field shift (A[6:4]).
    pub const CAS_LATENCY_SHIFT: u32 = 4;
    /// Operating mode field shift (A[8:7], `00` = standard).
    pub const OPERATING_MODE_SHIFT: u32 = 7;
    /// Write burst mode bit position (A9, `0` = programmed burst length).
    pub const WRITE_BURST_BIT: u32 = 9;

    const FIELD3: u16 = 0b111;
    const FIELD2: u16 = 0b11;

    /// Mode for single-word accesses at the given CAS latency.
    pub const fn single_access(cas_latency: u32) -> Self {
        Self { cas_latency }
    }

    /// Programmed CAS latency.
    pub const fn cas_latency(&self) -> u32 {
        self.cas_latency
    }

    /// Encodes the register onto address pins A[10:0].
    pub const fn encode(&self) -> u16 {
        Self::BURST_LENGTH_1 | (((self.cas_latency as u16) & Self::FIELD3) << Self::CAS_LATENCY_SHIFT)
    }

    /// Decodes address pins A[10:0]; returns `None` for modes other than single-access.
    pub const fn decode(bits: u16) -> Option<Self> {
        let burst_length = bits & Self::FIELD3;
        let interleaved = (bits >> Self::BURST_TYPE_BIT) & 1;
        let cas_latency = (bits >> Self::CAS_LATENCY_SHIFT) & Self::FIELD3;
        let operating_mode = (bits >> Self::OPERATING_MODE_SHIFT) & Self::FIELD2;
        let single_write = (bits >> Self::WRITE_BURST_BIT) & 1;
        let reserved = bits >> (Self::WRITE_BURST_BIT + 1);
        if burst_length != Self::BURST_LENGTH_1
            || interleaved != 0
            || operating_mode != 0
            || single_write != 0
            || reserved != 0
        {
            return None;
        }
        match cas_latency {
            2 | 3 => Some(Self::single_access(cas_latency as u32)),
            _ => None,
        }
    }
}
