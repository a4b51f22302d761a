//! Pin-level signal bundles.
//!
//! The host-facing request/response interface and the device-facing command/address/data bus,
//! as seen on one tick. Data direction on the shared bus is always explicit.

use crate::controller::command::Command;

/// Host inputs sampled on every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostInputs {
    /// Synchronous reset; aborts any operation and returns the controller to Init.
    pub reset: bool,
    /// Request a read of `address`.
    pub read: bool,
    /// Request a write of `write_data` to `address`.
    pub write: bool,
    /// Request a refresh opportunity.
    pub refresh: bool,
    /// Byte address.
    pub address: u32,
    /// Byte to write.
    pub write_data: u8,
}

impl HostInputs {
    /// No request asserted.
    pub const fn idle() -> Self {
        Self {
            reset: false,
            read: false,
            write: false,
            refresh: false,
            address: 0,
            write_data: 0,
        }
    }

    /// A read request for `address`.
    pub const fn read(address: u32) -> Self {
        Self {
            read: true,
            address,
            ..Self::idle()
        }
    }

    /// A write request of `data` to `address`.
    pub const fn write(address: u32, data: u8) -> Self {
        Self {
            write: true,
            address,
            write_data: data,
            ..Self::idle()
        }
    }

    /// A forced refresh request.
    pub const fn refresh() -> Self {
        Self {
            refresh: true,
            ..Self::idle()
        }
    }

    /// Reset asserted.
    pub const fn reset() -> Self {
        Self {
            reset: true,
            ..Self::idle()
        }
    }

    /// Returns `true` if any request (read, write, or refresh) is asserted.
    pub const fn has_request(&self) -> bool {
        self.read || self.write || self.refresh
    }
}

/// Registered host outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostOutputs {
    /// Byte selected from the last read word; valid while `data_ready` is set.
    pub read_byte: u8,
    /// Full 32-bit word containing the last read byte.
    pub read_word: u32,
    /// One-tick pulse marking valid read data.
    pub data_ready: bool,
    /// The controller cannot accept a request.
    pub busy: bool,
}

/// Direction of the shared data bus from the controller's point of view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DataDirection {
    /// The controller drives `dq_out` onto the bus.
    Drive,
    /// The controller's driver is released and the bus is sampled.
    #[default]
    Sample,
}

/// Device-facing pins driven by the controller for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DeviceBus {
    /// Command on `{RAS#, CAS#, WE#}`.
    pub command: Command,
    /// Address pins A[12:0].
    pub address: u16,
    /// Bank select pins.
    pub bank: u8,
    /// Value driven on the data bus when `direction` is [`DataDirection::Drive`].
    pub dq_out: u32,
    /// Data bus direction.
    pub direction: DataDirection,
    /// Byte mask (DQM); bit n high masks lane n.
    pub dqm: u8,
}

impl DeviceBus {
    /// The per-tick default: NOP, bus released, all lanes enabled.
    pub const fn nop() -> Self {
        Self {
            command: Command::Nop,
            address: 0,
            bank: 0,
            dq_out: 0,
            direction: DataDirection::Sample,
            dqm: 0,
        }
    }

    /// Returns `true` if the controller drives the data bus this tick.
    pub fn is_driving(&self) -> bool {
        self.direction == DataDirection::Drive
    }
}
