//! Data path buffer.
//!
//! Holds the one outstanding request, the data bus direction, the phase-shifted capture register
//! that samples the bus, and the registered read outputs.
//!
//! The capture register models the second, phase-shifted sampling clock as a single-register
//! delay line: the word the device drives on tick `n` is visible to the sequencer on tick `n + 1`,
//! and there is exactly one authoritative sample per tick.

use crate::common::addr::{ByteAddr, ByteLane};
use crate::controller::signals::{DataDirection, DeviceBus};

/// A request accepted from the host, held until its operation completes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    /// Byte address, already masked to the device capacity.
    pub address: ByteAddr,
    /// Byte to write (ignored for reads).
    pub write_data: u8,
    /// Write (`true`) or read (`false`).
    pub is_write: bool,
}

/// Request latch, bus direction, and read output registers.
#[derive(Clone, Debug, Default)]
pub struct DataPath {
    pending: Option<PendingRequest>,
    direction: DataDirection,
    lane: ByteLane,
    captured: u32,
    read_word: u32,
    read_byte: u8,
    data_ready: bool,
}

impl DataPath {
    /// Creates an empty data path sampling the bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops any pending request, releases the bus, and clears the outputs.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Per-tick defaults: release the bus and end any `data_ready` pulse.
    pub const fn begin_tick(&mut self) {
        self.direction = DataDirection::Sample;
        self.data_ready = false;
    }

    /// Latches an accepted request.
    pub const fn latch(&mut self, request: PendingRequest) {
        self.pending = Some(request);
    }

    /// The outstanding request, if any.
    pub const fn pending(&self) -> Option<PendingRequest> {
        self.pending
    }

    /// Discards the outstanding request once its operation completes.
    pub const fn release(&mut self) {
        self.pending = None;
    }

    /// Records the lane a Read will select.
    pub const fn select_lane(&mut self, lane: ByteLane) {
        self.lane = lane;
    }

    /// Drives the write byte on every lane and masks all but the target lane.
    pub const fn drive_write(&mut self, bus: &mut DeviceBus, lane: ByteLane, data: u8) {
        self.direction = DataDirection::Drive;
        bus.dq_out = ByteLane::replicate(data);
        bus.dqm = lane.write_mask();
        bus.direction = DataDirection::Drive;
    }

    /// Latches the captured word and its selected byte, and raises `data_ready` for this tick.
    pub const fn complete_read(&mut self) {
        self.read_word = self.captured;
        self.read_byte = self.lane.select(self.captured);
        self.data_ready = true;
    }

    /// Clocks the capture register with the bus value of this tick.
    pub const fn capture(&mut self, dq: u32) {
        self.captured = dq;
    }

    /// Current bus direction.
    pub const fn direction(&self) -> DataDirection {
        self.direction
    }

    /// Word held by the capture register.
    pub const fn captured(&self) -> u32 {
        self.captured
    }

    /// Last read word.
    pub const fn read_word(&self) -> u32 {
        self.read_word
    }

    /// Byte selected from the last read word.
    pub const fn read_byte(&self) -> u8 {
        self.read_byte
    }

    /// One-tick read-valid pulse.
    pub const fn data_ready(&self) -> bool {
        self.data_ready
    }
}
