//! Address Decoding Unit Tests.
//!
//! Verifies the `lane | column | row | bank` split, capacity masking, and byte-lane helpers.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use sdramctl_core::common::addr::{AddressMap, ByteAddr, ByteLane, DecodedAddr};
use sdramctl_core::common::constants::{DATA_BITS, HOST_ADDRESS_BITS, LANE_BITS};
use sdramctl_core::common::error::ConfigError;
use sdramctl_core::config::GeometryConfig;

fn default_map() -> AddressMap {
    AddressMap::new(&GeometryConfig::default()).unwrap()
}

// ══════════════════════════════════════════════════════════
// 1. Geometry
// ══════════════════════════════════════════════════════════

#[test]
fn default_geometry_is_eight_mebibytes() {
    let map = default_map();
    assert_eq!(map.address_bits(), HOST_ADDRESS_BITS);
    assert_eq!(map.capacity_bytes(), 8 * 1024 * 1024);
    assert_eq!(map.banks(), 4);
}

#[rstest]
#[case(3, 11, 8, "bank_bits")]
#[case(2, 10, 8, "row_bits")]
#[case(2, 14, 8, "row_bits")]
#[case(2, 11, 0, "column_bits")]
#[case(2, 11, 11, "column_bits")]
fn out_of_range_geometry_is_rejected(
    #[case] bank_bits: u32,
    #[case] row_bits: u32,
    #[case] column_bits: u32,
    #[case] expected: &str,
) {
    let geometry = GeometryConfig {
        bank_bits,
        row_bits,
        column_bits,
    };
    match AddressMap::new(&geometry) {
        Err(ConfigError::GeometryOutOfRange { field, .. }) => assert_eq!(field, expected),
        other => panic!("expected GeometryOutOfRange, got {other:?}"),
    }
}

#[test]
fn single_bank_geometry_is_accepted() {
    let geometry = GeometryConfig {
        bank_bits: 0,
        row_bits: 13,
        column_bits: 10,
    };
    let map = AddressMap::new(&geometry).unwrap();
    assert_eq!(map.banks(), 1);
    assert_eq!(map.address_bits(), 25);
}

// ══════════════════════════════════════════════════════════
// 2. Decoding
// ══════════════════════════════════════════════════════════

#[test]
fn decode_splits_fields_from_lsb_up() {
    let map = default_map();
    let fields = map.decode(ByteAddr::new(0x7695FE));
    assert_eq!(
        fields,
        DecodedAddr {
            bank: 3,
            row: 0x5A5,
            column: 0x7F,
            lane: ByteLane::Lane2,
        }
    );
    assert_eq!(map.encode(fields), ByteAddr::new(0x7695FE));
}

#[test]
fn consecutive_bytes_share_a_word() {
    let map = default_map();
    let base = map.decode(ByteAddr::new(0x1000));
    for offset in 1..4 {
        let fields = map.decode(ByteAddr::new(0x1000 + offset));
        assert_eq!((fields.bank, fields.row, fields.column), (base.bank, base.row, base.column));
        assert_eq!(fields.lane, ByteLane::from_offset(offset));
    }
}

#[test]
fn mask_drops_bits_above_capacity() {
    let map = default_map();
    assert_eq!(map.mask(ByteAddr::new(0xFF80_0001)), ByteAddr::new(0x0000_0001));
    assert_eq!(map.mask(ByteAddr::new(0x007F_FFFF)), ByteAddr::new(0x007F_FFFF));
}

#[test]
fn column_pins_set_auto_precharge() {
    let map = default_map();
    assert_eq!(map.column_pins(0x7F), 0x47F);
    assert_eq!(map.column_pins(0), 1 << 10);
}

#[test]
fn word_index_matches_aligned_address() {
    let map = default_map();
    let addr = ByteAddr::new(0x0012_3457);
    let fields = map.decode(addr);
    assert_eq!(
        map.word_index(fields.bank, fields.row, fields.column),
        addr.word_aligned().val() >> 2
    );
}

// ══════════════════════════════════════════════════════════
// 3. Byte lanes
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(ByteLane::Lane0, 0b1110, 0x44)]
#[case(ByteLane::Lane1, 0b1101, 0x33)]
#[case(ByteLane::Lane2, 0b1011, 0x22)]
#[case(ByteLane::Lane3, 0b0111, 0x11)]
fn lane_mask_and_select(#[case] lane: ByteLane, #[case] mask: u8, #[case] byte: u8) {
    assert_eq!(lane.write_mask(), mask);
    assert_eq!(lane.select(0x1122_3344), byte);
}

proptest! {
    #[test]
    fn decode_encode_round_trips_masked_address(raw in any::<u32>()) {
        let map = default_map();
        let masked = map.mask(ByteAddr::new(raw));
        prop_assert_eq!(map.encode(map.decode(masked)), masked);
    }

    #[test]
    fn merge_only_touches_its_lane(word in any::<u32>(), byte in any::<u8>(), offset in 0u32..4) {
        let lane = ByteLane::from_offset(offset);
        let merged = lane.merge(word, byte);
        prop_assert_eq!(lane.select(merged), byte);
        for other in ByteLane::ALL.into_iter().filter(|l| *l != lane) {
            prop_assert_eq!(other.select(merged), other.select(word));
        }
    }
}

#[test]
fn lane_bits_follow_data_width() {
    assert_eq!(1 << LANE_BITS, DATA_BITS / 8);
    assert_eq!(ByteLane::ALL.len() as u32, DATA_BITS / 8);
}
