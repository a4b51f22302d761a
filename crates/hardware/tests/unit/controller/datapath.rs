//! Data Path Unit Tests.
//!
//! Verifies the request latch, write drive, and read capture registers.

use sdramctl_core::common::addr::{ByteAddr, ByteLane};
use sdramctl_core::controller::datapath::{DataPath, PendingRequest};
use sdramctl_core::controller::signals::{DataDirection, DeviceBus};

fn request(is_write: bool) -> PendingRequest {
    PendingRequest {
        address: ByteAddr::new(0x0000_0102),
        write_data: 0x5A,
        is_write,
    }
}

#[test]
fn starts_empty_and_sampling() {
    let dp = DataPath::new();
    assert_eq!(dp.pending(), None);
    assert_eq!(dp.direction(), DataDirection::Sample);
    assert!(!dp.data_ready());
}

#[test]
fn latch_and_release() {
    let mut dp = DataPath::new();
    dp.latch(request(true));
    assert_eq!(dp.pending(), Some(request(true)));
    dp.release();
    assert_eq!(dp.pending(), None);
}

#[test]
fn write_drive_replicates_byte_and_masks_other_lanes() {
    let mut dp = DataPath::new();
    let mut bus = DeviceBus::nop();
    dp.drive_write(&mut bus, ByteLane::Lane1, 0xC3);

    assert_eq!(bus.dq_out, 0xC3C3_C3C3);
    assert_eq!(bus.dqm, 0b1101);
    assert!(bus.is_driving());
    assert_eq!(dp.direction(), DataDirection::Drive);

    dp.begin_tick();
    assert_eq!(dp.direction(), DataDirection::Sample);
}

#[test]
fn read_completion_selects_lane_from_captured_word() {
    let mut dp = DataPath::new();
    dp.select_lane(ByteLane::Lane3);
    dp.capture(0xA1B2_C3D4);
    dp.complete_read();

    assert!(dp.data_ready());
    assert_eq!(dp.read_word(), 0xA1B2_C3D4);
    assert_eq!(dp.read_byte(), 0xA1);

    // data_ready is a one-tick pulse; the data itself stays registered.
    dp.begin_tick();
    assert!(!dp.data_ready());
    assert_eq!(dp.read_byte(), 0xA1);
}

#[test]
fn capture_register_follows_the_bus() {
    let mut dp = DataPath::new();
    dp.capture(1);
    dp.capture(2);
    assert_eq!(dp.captured(), 2);
}

#[test]
fn reset_clears_everything() {
    let mut dp = DataPath::new();
    dp.latch(request(false));
    dp.capture(0xFFFF_FFFF);
    dp.complete_read();
    dp.reset();

    assert_eq!(dp.pending(), None);
    assert!(!dp.data_ready());
    assert_eq!(dp.read_word(), 0);
    assert_eq!(dp.captured(), 0);
}
