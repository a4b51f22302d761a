//! Host Address Types and Decoding.
//!
//! This module defines the host byte address and its decomposition onto the device pins. It provides:
//! 1. **Type Safety:** `ByteAddr` keeps host byte addresses apart from raw pin values.
//! 2. **Byte Lanes:** `ByteLane` selects, masks, and replicates bytes on the 32-bit data bus.
//! 3. **Decoding:** `AddressMap` splits a byte address into bank, row, column, and lane fields.
//!
//! The layout, from least significant bit upwards, is `lane | column | row | bank`.

use crate::common::constants::{
    AUTO_PRECHARGE_BIT, DQM_ALL_MASKED, LANE_BITS, MAX_BANK_BITS, MAX_COLUMN_BITS, MAX_ROW_BITS,
    MIN_COLUMN_BITS, MIN_ROW_BITS,
};
use crate::common::error::ConfigError;
use crate::config::GeometryConfig;

/// A byte address as presented on the host request interface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteAddr(pub u32);

impl ByteAddr {
    /// Creates a new byte address from a raw value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Returns the byte lane addressed by the two low bits.
    #[inline(always)]
    pub const fn lane(self) -> ByteLane {
        ByteLane::from_offset(self.0)
    }

    /// Returns the address of the 32-bit word containing this byte.
    #[inline(always)]
    pub const fn word_aligned(self) -> Self {
        Self(self.0 & !((1 << LANE_BITS) - 1))
    }
}

/// One of the four byte lanes of the 32-bit data bus.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ByteLane {
    /// Bits `[7:0]`.
    #[default]
    Lane0,
    /// Bits `[15:8]`.
    Lane1,
    /// Bits `[23:16]`.
    Lane2,
    /// Bits `[31:24]`.
    Lane3,
}

impl ByteLane {
    /// All lanes in bus order.
    pub const ALL: [Self; 4] = [Self::Lane0, Self::Lane1, Self::Lane2, Self::Lane3];

    /// Decodes the lane from the two low bits of `offset`; higher bits are ignored.
    #[inline]
    pub const fn from_offset(offset: u32) -> Self {
        match offset & 0b11 {
            0 => Self::Lane0,
            1 => Self::Lane1,
            2 => Self::Lane2,
            _ => Self::Lane3,
        }
    }

    /// Returns the lane index (0-3).
    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Bit position of the lane's least significant bit.
    #[inline]
    pub const fn shift(self) -> u32 {
        self.index() * 8
    }

    /// Byte mask (DQM) enabling only this lane; a set bit masks its lane.
    #[inline]
    pub const fn write_mask(self) -> u8 {
        DQM_ALL_MASKED & !(1 << self.index())
    }

    /// Extracts this lane's byte from a bus word.
    #[inline]
    pub const fn select(self, word: u32) -> u8 {
        (word >> self.shift()) as u8
    }

    /// Replicates `byte` across all four lanes so any single-lane mask writes it.
    #[inline]
    pub const fn replicate(byte: u8) -> u32 {
        u32::from_ne_bytes([byte; 4])
    }

    /// Returns `word` with this lane replaced by `byte`.
    #[inline]
    pub const fn merge(self, word: u32, byte: u8) -> u32 {
        (word & !(0xFF << self.shift())) | ((byte as u32) << self.shift())
    }
}

/// A byte address split into device fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DecodedAddr {
    /// Bank select (BA pins).
    pub bank: u8,
    /// Row address driven with Bank-Activate.
    pub row: u16,
    /// Column address driven with Read/Write.
    pub column: u16,
    /// Byte lane within the addressed word.
    pub lane: ByteLane,
}

/// Field widths used to split host addresses onto the device pins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressMap {
    bank_bits: u32,
    row_bits: u32,
    column_bits: u32,
}

impl AddressMap {
    /// Builds an address map from the configured geometry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::GeometryOutOfRange`] if a width does not fit the device pin budget.
    pub fn new(geometry: &GeometryConfig) -> Result<Self, ConfigError> {
        check_width("bank_bits", geometry.bank_bits, 0, MAX_BANK_BITS)?;
        check_width("row_bits", geometry.row_bits, MIN_ROW_BITS, MAX_ROW_BITS)?;
        check_width(
            "column_bits",
            geometry.column_bits,
            MIN_COLUMN_BITS,
            MAX_COLUMN_BITS,
        )?;
        Ok(Self {
            bank_bits: geometry.bank_bits,
            row_bits: geometry.row_bits,
            column_bits: geometry.column_bits,
        })
    }

    /// Number of bank address bits.
    pub const fn bank_bits(&self) -> u32 {
        self.bank_bits
    }

    /// Number of row address bits.
    pub const fn row_bits(&self) -> u32 {
        self.row_bits
    }

    /// Number of column address bits.
    pub const fn column_bits(&self) -> u32 {
        self.column_bits
    }

    /// Number of banks.
    pub const fn banks(&self) -> usize {
        1 << self.bank_bits
    }

    /// Total width of a host byte address.
    pub const fn address_bits(&self) -> u32 {
        LANE_BITS + self.column_bits + self.row_bits + self.bank_bits
    }

    /// Device capacity in bytes.
    pub const fn capacity_bytes(&self) -> u64 {
        1 << self.address_bits()
    }

    /// Drops address bits above the device capacity.
    pub const fn mask(&self, addr: ByteAddr) -> ByteAddr {
        ByteAddr(addr.0 & (self.capacity_bytes() - 1) as u32)
    }

    /// Splits a byte address into bank, row, column, and lane.
    pub const fn decode(&self, addr: ByteAddr) -> DecodedAddr {
        let word = addr.0 >> LANE_BITS;
        let column = word & field_mask(self.column_bits);
        let row = (word >> self.column_bits) & field_mask(self.row_bits);
        let bank = (word >> (self.column_bits + self.row_bits)) & field_mask(self.bank_bits);
        DecodedAddr {
            bank: bank as u8,
            row: row as u16,
            column: column as u16,
            lane: addr.lane(),
        }
    }

    /// Reassembles a byte address from device fields.
    pub const fn encode(&self, fields: DecodedAddr) -> ByteAddr {
        let bank = fields.bank as u32 & field_mask(self.bank_bits);
        let row = fields.row as u32 & field_mask(self.row_bits);
        let column = fields.column as u32 & field_mask(self.column_bits);
        let word = (((bank << self.row_bits) | row) << self.column_bits) | column;
        ByteAddr((word << LANE_BITS) | fields.lane.index())
    }

    /// Linear word index of a (bank, row, column) triple, used as a storage key.
    pub const fn word_index(&self, bank: u8, row: u16, column: u16) -> u32 {
        self.encode(DecodedAddr {
            bank,
            row,
            column,
            lane: ByteLane::Lane0,
        })
        .0 >> LANE_BITS
    }

    /// Address pins for a Read/Write with auto-precharge.
    pub const fn column_pins(&self, column: u16) -> u16 {
        column | (1 << AUTO_PRECHARGE_BIT)
    }
}

const fn field_mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

fn check_width(field: &'static str, bits: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if !(min..=max).contains(&bits) {
        return Err(ConfigError::GeometryOutOfRange {
            field,
            bits,
            min,
            max,
        });
    }
    Ok(())
}
