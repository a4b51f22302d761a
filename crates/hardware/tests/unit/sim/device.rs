//! Device Model Unit Tests.
//!
//! Drives the behavioral SDRAM with hand-written command streams and checks that timing
//! violations are reported. Uses the fast grade: tRP 2, tRC 7, tRCD 2, tMRD 2, CL 2, tWR 2.

use pretty_assertions::assert_eq;
use sdramctl_core::common::addr::{AddressMap, ByteAddr, ByteLane, DecodedAddr};
use sdramctl_core::common::error::DeviceError;
use sdramctl_core::controller::command::{Command, ModeRegister};
use sdramctl_core::controller::signals::{DataDirection, DeviceBus};
use sdramctl_core::sim::device::SdramModel;
use sdramctl_core::timing::TimingParameters;

use crate::common::harness::fast_config;

fn map() -> AddressMap {
    AddressMap::new(&fast_config().geometry).unwrap()
}

fn device() -> SdramModel {
    let timing = TimingParameters::from_config(&fast_config()).unwrap();
    SdramModel::new(timing, map())
}

fn cmd(command: Command, bank: u8, address: u16) -> DeviceBus {
    DeviceBus {
        command,
        bank,
        address,
        ..DeviceBus::nop()
    }
}

fn nop(dev: &mut SdramModel, cycles: u64) {
    for _ in 0..cycles {
        let _ = dev.clock(&DeviceBus::nop()).unwrap();
    }
}

/// Runs the power-up sequence; the device is ready for commands from cycle 20.
fn initialized() -> SdramModel {
    let mut dev = device();
    for cycle in 1..=19 {
        let bus = match cycle {
            1 => cmd(Command::Precharge, 0, 1 << 10),
            3 | 10 => cmd(Command::AutoRefresh, 0, 0),
            17 => cmd(Command::ModeRegisterSet, 0, ModeRegister::single_access(2).encode()),
            _ => DeviceBus::nop(),
        };
        assert_eq!(dev.clock(&bus), Ok(None), "cycle {cycle}");
    }
    assert!(dev.is_initialized());
    dev
}

const AP: u16 = 1 << 10;

fn addr(bank: u8, row: u16, column: u16, lane: ByteLane) -> ByteAddr {
    map().encode(DecodedAddr {
        bank,
        row,
        column,
        lane,
    })
}

// ══════════════════════════════════════════════════════════
// 1. Initialization
// ══════════════════════════════════════════════════════════

#[test]
fn activate_before_initialization_is_rejected() {
    let mut dev = device();
    assert_eq!(
        dev.clock(&cmd(Command::Activate, 0, 0)),
        Err(DeviceError::NotInitialized {
            cycle: 1,
            command: Command::Activate
        })
    );
}

#[test]
fn initialization_sequence_loads_mode() {
    let dev = initialized();
    assert_eq!(dev.mode(), Some(ModeRegister::single_access(2)));
    assert_eq!(dev.counters().refreshes, 2);
    assert_eq!(dev.counters().longest_refresh_gap, 7);
}

#[test]
fn refresh_before_precharge_completes_is_rejected() {
    let mut dev = device();
    let _ = dev.clock(&cmd(Command::Precharge, 0, AP)).unwrap();
    assert!(matches!(
        dev.clock(&cmd(Command::AutoRefresh, 0, 0)),
        Err(DeviceError::BanksNotIdle { cycle: 2, .. })
    ));
}

#[test]
fn back_to_back_refresh_is_rejected() {
    let mut dev = initialized();
    let _ = dev.clock(&cmd(Command::AutoRefresh, 0, 0)).unwrap();
    nop(&mut dev, 5);
    assert_eq!(
        dev.clock(&cmd(Command::AutoRefresh, 0, 0)),
        Err(DeviceError::DeviceBusy {
            cycle: 26,
            command: Command::AutoRefresh,
            ready_at: 27
        })
    );
}

#[test]
fn precharge_during_refresh_is_rejected() {
    let mut dev = initialized();
    let _ = dev.clock(&cmd(Command::AutoRefresh, 0, 0)).unwrap(); // 20, busy until 27
    nop(&mut dev, 2);
    assert_eq!(
        dev.clock(&cmd(Command::Precharge, 0, AP)),
        Err(DeviceError::DeviceBusy {
            cycle: 23,
            command: Command::Precharge,
            ready_at: 27
        })
    );
    nop(&mut dev, 3);
    assert_eq!(dev.clock(&cmd(Command::Precharge, 0, AP)), Ok(None));
}

#[test]
fn unsupported_mode_word() {
    let mut dev = initialized();
    assert_eq!(
        dev.clock(&cmd(Command::ModeRegisterSet, 0, 0x028)),
        Err(DeviceError::UnsupportedMode {
            cycle: 20,
            bits: 0x028
        })
    );
}

// ══════════════════════════════════════════════════════════
// 2. Row and column timing
// ══════════════════════════════════════════════════════════

#[test]
fn read_returns_word_after_cas_latency() {
    let mut dev = initialized();
    let target = addr(1, 5, 3, ByteLane::Lane0);
    dev.poke_word(target, 0xCAFE_F00D);

    assert_eq!(dev.clock(&cmd(Command::Activate, 1, 5)), Ok(None)); // 20
    nop(&mut dev, 1);
    assert_eq!(dev.clock(&cmd(Command::Read, 1, 3 | AP)), Ok(None)); // 22
    assert_eq!(dev.clock(&DeviceBus::nop()), Ok(Some(0xCAFE_F00D))); // 23
    assert_eq!(dev.clock(&DeviceBus::nop()), Ok(None));
    assert_eq!(dev.bank(1).open_row, None);
}

#[test]
fn read_before_trcd_is_rejected() {
    let mut dev = initialized();
    let _ = dev.clock(&cmd(Command::Activate, 2, 9)).unwrap();
    assert_eq!(
        dev.clock(&cmd(Command::Read, 2, AP)),
        Err(DeviceError::ActivateToAccess {
            cycle: 21,
            command: Command::Read,
            bank: 2,
            elapsed: 1,
            required: 2
        })
    );
}

#[test]
fn read_without_open_row_is_rejected() {
    let mut dev = initialized();
    assert_eq!(
        dev.clock(&cmd(Command::Read, 0, AP)),
        Err(DeviceError::RowNotOpen {
            cycle: 20,
            command: Command::Read,
            bank: 0
        })
    );
}

#[test]
fn double_activate_is_rejected() {
    let mut dev = initialized();
    let _ = dev.clock(&cmd(Command::Activate, 0, 4)).unwrap();
    assert_eq!(
        dev.clock(&cmd(Command::Activate, 0, 6)),
        Err(DeviceError::RowAlreadyOpen {
            cycle: 21,
            bank: 0,
            row: 4
        })
    );
}

#[test]
fn activate_during_auto_precharge_is_rejected() {
    let mut dev = initialized();
    let _ = dev.clock(&cmd(Command::Activate, 0, 4)).unwrap(); // 20
    nop(&mut dev, 1);
    let _ = dev.clock(&cmd(Command::Read, 0, AP)).unwrap(); // 22, bank ready at 25
    nop(&mut dev, 1);
    assert_eq!(
        dev.clock(&cmd(Command::Activate, 0, 4)),
        Err(DeviceError::BankPrecharging {
            cycle: 24,
            bank: 0,
            ready_at: 25
        })
    );
    assert_eq!(dev.clock(&cmd(Command::Activate, 0, 4)), Ok(None));
}

#[test]
fn write_merges_unmasked_lane() {
    let mut dev = initialized();
    let target = addr(3, 100, 7, ByteLane::Lane2);
    dev.poke_word(target, 0x1122_3344);

    let _ = dev.clock(&cmd(Command::Activate, 3, 100)).unwrap();
    nop(&mut dev, 1);
    let write = DeviceBus {
        dq_out: ByteLane::replicate(0xAB),
        dqm: ByteLane::Lane2.write_mask(),
        direction: DataDirection::Drive,
        ..cmd(Command::Write, 3, 7 | AP)
    };
    assert_eq!(dev.clock(&write), Ok(None));
    assert_eq!(dev.peek_word(target), 0x11AB_3344);
    assert_eq!(dev.peek_byte(target), 0xAB);
    assert_eq!(dev.counters().writes, 1);

    // tWR + tRP before the bank can be activated again.
    nop(&mut dev, 2);
    assert!(matches!(
        dev.clock(&cmd(Command::Activate, 3, 100)),
        Err(DeviceError::BankPrecharging { ready_at: 26, .. })
    ));
}

#[test]
fn controller_driving_during_read_data_is_contention() {
    let mut dev = initialized();
    let _ = dev.clock(&cmd(Command::Activate, 0, 0)).unwrap();
    nop(&mut dev, 1);
    let _ = dev.clock(&cmd(Command::Read, 0, AP)).unwrap();
    let driving = DeviceBus {
        direction: DataDirection::Drive,
        ..DeviceBus::nop()
    };
    assert_eq!(
        dev.clock(&driving),
        Err(DeviceError::BusContention { cycle: 23 })
    );
}

#[test]
fn unwritten_memory_reads_zero() {
    let dev = initialized();
    assert_eq!(dev.peek_word(ByteAddr::new(0x1234)), 0);
    assert_eq!(dev.words_written(), 0);
}
