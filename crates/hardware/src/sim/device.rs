//! Behavioral SDRAM device model.
//!
//! This module provides a single-rank SDR SDRAM with a 32-bit data bus. It provides:
//! 1. **Storage:** Sparse word storage keyed by (bank, row, column); unwritten words read as 0.
//! 2. **Bank tracking:** Open row, activation time, and precharge completion per bank.
//! 3. **Timing checks:** tRP, tRCD, tRC (refresh), tMRD, and tWR enforcement, reported as
//!    [`DeviceError`]s rather than silently corrupted data.
//! 4. **Read pipeline:** Data appears on the bus `CAS latency` ticks after the Read.
//!
//! The model samples the command pins registered by the controller on the previous tick, so a
//! command the controller registers on tick `n` is processed by the model on tick `n + 1`.

use std::collections::{HashMap, VecDeque};

use tracing::{debug, trace};

use crate::common::addr::{AddressMap, ByteAddr, ByteLane, DecodedAddr};
use crate::common::constants::AUTO_PRECHARGE_BIT;
use crate::common::error::DeviceError;
use crate::controller::command::{Command, ModeRegister};
use crate::controller::signals::DeviceBus;
use crate::timing::TimingParameters;

/// Refreshes the device needs before it accepts row commands.
const INIT_REFRESHES: u32 = 2;

/// Row state of one bank.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BankState {
    /// Currently open row.
    pub open_row: Option<u16>,
    /// Cycle of the last Bank-Activate.
    pub activated_at: u64,
    /// First cycle at which the bank may be activated again.
    pub ready_at: u64,
}

/// Summary counters kept by the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceCounters {
    /// Bank-Activate commands accepted.
    pub activates: u64,
    /// Read commands accepted.
    pub reads: u64,
    /// Write commands accepted.
    pub writes: u64,
    /// Auto-Refresh commands accepted.
    pub refreshes: u64,
    /// Longest gap between two Auto-Refresh commands, in cycles.
    pub longest_refresh_gap: u64,
}

/// A cycle-level SDRAM device.
#[derive(Clone, Debug)]
pub struct SdramModel {
    map: AddressMap,
    timing: TimingParameters,
    cycle: u64,
    storage: HashMap<u32, u32>,
    banks: Vec<BankState>,
    busy_until: u64,
    mode: Option<ModeRegister>,
    refreshes_since_power_up: u32,
    last_refresh: Option<u64>,
    output: VecDeque<(u64, u32)>,
    counters: DeviceCounters,
}

impl SdramModel {
    /// Creates a powered-up, uninitialized device.
    ///
    /// # Arguments
    ///
    /// * `timing` - Cycle counts the device enforces (the same grade the controller runs).
    /// * `map` - Bank/row/column widths.
    pub fn new(timing: TimingParameters, map: AddressMap) -> Self {
        Self {
            map,
            timing,
            cycle: 0,
            storage: HashMap::new(),
            banks: vec![BankState::default(); map.banks()],
            busy_until: 0,
            mode: None,
            refreshes_since_power_up: 0,
            last_refresh: None,
            output: VecDeque::new(),
            counters: DeviceCounters::default(),
        }
    }

    /// Processes the pins for one tick.
    ///
    /// # Returns
    ///
    /// The word the device drives on the data bus this tick, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`DeviceError`] if the command violates the protocol or a timing constraint,
    /// or if the controller drives the data bus while the device does.
    pub fn clock(&mut self, bus: &DeviceBus) -> Result<Option<u32>, DeviceError> {
        self.cycle += 1;
        let now = self.cycle;

        let driven = match self.output.front() {
            Some(&(at, word)) if at == now => {
                let _ = self.output.pop_front();
                Some(word)
            }
            _ => None,
        };
        if driven.is_some() && bus.is_driving() {
            return Err(DeviceError::BusContention { cycle: now });
        }

        if bus.command != Command::Nop {
            trace!(cycle = now, command = %bus.command, bank = bus.bank, address = bus.address, "device");
        }

        match bus.command {
            Command::Nop | Command::BurstTerminate => {}
            Command::Activate => self.activate(now, bus)?,
            Command::Read => self.read(now, bus)?,
            Command::Write => self.write(now, bus)?,
            Command::Precharge => self.precharge(now, bus)?,
            Command::AutoRefresh => self.auto_refresh(now)?,
            Command::ModeRegisterSet => self.mode_register_set(now, bus)?,
        }
        Ok(driven)
    }

    fn require_initialized(&self, now: u64, command: Command) -> Result<(), DeviceError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(DeviceError::NotInitialized {
                cycle: now,
                command,
            })
        }
    }

    fn require_not_busy(&self, now: u64, command: Command) -> Result<(), DeviceError> {
        if now < self.busy_until {
            return Err(DeviceError::DeviceBusy {
                cycle: now,
                command,
                ready_at: self.busy_until,
            });
        }
        Ok(())
    }

    fn require_all_idle(&self, now: u64, command: Command) -> Result<(), DeviceError> {
        for (index, bank) in self.banks.iter().enumerate() {
            if bank.open_row.is_some() || now < bank.ready_at {
                return Err(DeviceError::BanksNotIdle {
                    cycle: now,
                    command,
                    bank: index as u8,
                });
            }
        }
        Ok(())
    }

    const fn bank_index(&self, bank: u8) -> usize {
        bank as usize % self.banks.len()
    }

    fn activate(&mut self, now: u64, bus: &DeviceBus) -> Result<(), DeviceError> {
        self.require_initialized(now, Command::Activate)?;
        self.require_not_busy(now, Command::Activate)?;

        let index = self.bank_index(bus.bank);
        let bank = &mut self.banks[index];
        if let Some(row) = bank.open_row {
            return Err(DeviceError::RowAlreadyOpen {
                cycle: now,
                bank: bus.bank,
                row,
            });
        }
        if now < bank.ready_at {
            return Err(DeviceError::BankPrecharging {
                cycle: now,
                bank: bus.bank,
                ready_at: bank.ready_at,
            });
        }
        bank.open_row = Some(bus.address & row_mask(self.map.row_bits()));
        bank.activated_at = now;
        self.counters.activates += 1;
        Ok(())
    }

    /// Validates a Read/Write and returns the addressed word index.
    fn column_access(
        &self,
        now: u64,
        bus: &DeviceBus,
        command: Command,
    ) -> Result<u32, DeviceError> {
        self.require_initialized(now, command)?;

        let index = self.bank_index(bus.bank);
        let required = self.timing.activate_to_rw() as u64;
        let bank = &self.banks[index];
        let Some(row) = bank.open_row else {
            return Err(DeviceError::RowNotOpen {
                cycle: now,
                command,
                bank: bus.bank,
            });
        };
        let elapsed = now - bank.activated_at;
        if elapsed < required {
            return Err(DeviceError::ActivateToAccess {
                cycle: now,
                command,
                bank: bus.bank,
                elapsed,
                required,
            });
        }

        let column = bus.address & row_mask(self.map.column_bits());
        Ok(self.map.word_index(bus.bank, row, column))
    }

    fn auto_precharge(&mut self, bank: u8, ready_at: u64) {
        let index = self.bank_index(bank);
        let state = &mut self.banks[index];
        state.open_row = None;
        state.ready_at = ready_at;
    }

    fn read(&mut self, now: u64, bus: &DeviceBus) -> Result<(), DeviceError> {
        let word_index = self.column_access(now, bus, Command::Read)?;
        let cas_latency = self
            .mode
            .map_or(self.timing.cas_latency(), |mode| mode.cas_latency());
        let word = self.storage.get(&word_index).copied().unwrap_or(0);
        self.output.push_back((now + cas_latency as u64 - 1, word));

        if has_auto_precharge(bus.address) {
            // Auto-precharge begins once the read has been issued.
            let ready_at = now + 1 + self.timing.precharge_to_active() as u64;
            self.auto_precharge(bus.bank, ready_at);
        }
        self.counters.reads += 1;
        Ok(())
    }

    fn write(&mut self, now: u64, bus: &DeviceBus) -> Result<(), DeviceError> {
        let word_index = self.column_access(now, bus, Command::Write)?;
        let mut word = self.storage.get(&word_index).copied().unwrap_or(0);
        if bus.is_driving() {
            for lane in ByteLane::ALL {
                if bus.dqm & (1 << lane.index()) == 0 {
                    word = lane.merge(word, lane.select(bus.dq_out));
                }
            }
        }
        let _ = self.storage.insert(word_index, word);

        if has_auto_precharge(bus.address) {
            let ready_at = now
                + self.timing.write_recovery() as u64
                + self.timing.precharge_to_active() as u64;
            self.auto_precharge(bus.bank, ready_at);
        }
        self.counters.writes += 1;
        Ok(())
    }

    fn precharge(&mut self, now: u64, bus: &DeviceBus) -> Result<(), DeviceError> {
        self.require_not_busy(now, Command::Precharge)?;
        let ready_at = now + self.timing.precharge_to_active() as u64;
        if has_auto_precharge(bus.address) {
            for bank in &mut self.banks {
                bank.open_row = None;
                bank.ready_at = bank.ready_at.max(ready_at);
            }
        } else if self.banks[self.bank_index(bus.bank)].open_row.is_some() {
            self.auto_precharge(bus.bank, ready_at);
        }
        Ok(())
    }

    fn auto_refresh(&mut self, now: u64) -> Result<(), DeviceError> {
        self.require_not_busy(now, Command::AutoRefresh)?;
        self.require_all_idle(now, Command::AutoRefresh)?;

        self.busy_until = now + self.timing.refresh_cycle() as u64;
        if let Some(last) = self.last_refresh {
            self.counters.longest_refresh_gap = self.counters.longest_refresh_gap.max(now - last);
        }
        self.last_refresh = Some(now);
        self.refreshes_since_power_up = self.refreshes_since_power_up.saturating_add(1);
        self.counters.refreshes += 1;
        Ok(())
    }

    fn mode_register_set(&mut self, now: u64, bus: &DeviceBus) -> Result<(), DeviceError> {
        self.require_not_busy(now, Command::ModeRegisterSet)?;
        self.require_all_idle(now, Command::ModeRegisterSet)?;

        let Some(mode) = ModeRegister::decode(bus.address) else {
            return Err(DeviceError::UnsupportedMode {
                cycle: now,
                bits: bus.address,
            });
        };
        debug!(cycle = now, cas_latency = mode.cas_latency(), "mode register loaded");
        self.mode = Some(mode);
        self.busy_until = now + self.timing.mode_reg_set_delay() as u64;
        Ok(())
    }

    /// Returns `true` once the mode register is loaded and the initial refreshes are done.
    pub const fn is_initialized(&self) -> bool {
        self.mode.is_some() && self.refreshes_since_power_up >= INIT_REFRESHES
    }

    /// The loaded mode register.
    pub const fn mode(&self) -> Option<ModeRegister> {
        self.mode
    }

    /// Device ticks since construction.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Row state of `bank`.
    pub fn bank(&self, bank: u8) -> BankState {
        self.banks[self.bank_index(bank)]
    }

    /// Summary counters.
    pub const fn counters(&self) -> &DeviceCounters {
        &self.counters
    }

    /// Cycle of the most recent Auto-Refresh.
    pub const fn last_refresh(&self) -> Option<u64> {
        self.last_refresh
    }

    /// Reads the word containing `addr` without going through the command interface.
    pub fn peek_word(&self, addr: ByteAddr) -> u32 {
        let key = self.word_key(addr);
        self.storage.get(&key).copied().unwrap_or(0)
    }

    /// Reads the byte at `addr` without going through the command interface.
    pub fn peek_byte(&self, addr: ByteAddr) -> u8 {
        addr.lane().select(self.peek_word(addr))
    }

    /// Writes the word containing `addr` without going through the command interface.
    pub fn poke_word(&mut self, addr: ByteAddr, word: u32) {
        let key = self.word_key(addr);
        let _ = self.storage.insert(key, word);
    }

    /// Number of words that have been written.
    pub fn words_written(&self) -> usize {
        self.storage.len()
    }

    fn word_key(&self, addr: ByteAddr) -> u32 {
        let DecodedAddr {
            bank, row, column, ..
        } = self.map.decode(self.map.mask(addr));
        self.map.word_index(bank, row, column)
    }
}

const fn has_auto_precharge(address: u16) -> bool {
    address & (1 << AUTO_PRECHARGE_BIT) != 0
}

const fn row_mask(bits: u32) -> u16 {
    ((1u32 << bits) - 1) as u16
}
