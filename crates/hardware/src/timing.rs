//! Timing table.
//!
//! Converts a [`Config`] timing grade into the immutable cycle counts the sequencer compares its
//! cycle counter against, and derives the fixed command offsets of every operation from them.
//!
//! All counts are at least one cycle. Nanosecond values round up, so a derived delay is never
//! shorter than the data sheet minimum.

use serde::Serialize;

use crate::common::constants::NS_PER_SECOND;
use crate::common::error::ConfigError;
use crate::config::Config;

/// Cycle counts for every named device delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TimingParameters {
    precharge_to_active: u32,
    refresh_cycle: u32,
    mode_reg_set_delay: u32,
    activate_to_rw: u32,
    cas_latency: u32,
    write_recovery: u32,
    refresh_interval_cycles: u32,
    init_delay_cycles: u32,
}

/// Offsets of the power-up configuration commands, relative to entering Config.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigOffsets {
    /// First Auto-Refresh (after Precharge-All at offset 0).
    pub first_refresh: u32,
    /// Second Auto-Refresh.
    pub second_refresh: u32,
    /// Set-Mode-Register.
    pub mode_register: u32,
    /// Transition to Idle.
    pub ready: u32,
}

impl TimingParameters {
    /// Derives cycle counts from a configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the clock is zero, any count derives to zero or overflows,
    /// the CAS latency is not 2 or 3, a read cannot finish before its bank is precharged, the
    /// refresh interval is too short to fit a refresh between operations, or the power-up delay
    /// is shorter than the longest operation.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let hz = config.clock.frequency_hz;
        if hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        let t = &config.timing;

        let params = Self {
            precharge_to_active: ns_cycles("precharge_to_active", t.t_rp_ns, hz)?,
            refresh_cycle: ns_cycles("refresh_cycle", t.t_rc_ns, hz)?,
            mode_reg_set_delay: nonzero("mode_reg_set_delay", t.t_mrd_cycles)?,
            activate_to_rw: ns_cycles("activate_to_rw", t.t_rcd_ns, hz)?,
            cas_latency: t.cas_latency,
            write_recovery: nonzero("write_recovery", t.t_wr_cycles)?,
            refresh_interval_cycles: ns_cycles("refresh_interval", t.refresh_interval_ns, hz)?,
            init_delay_cycles: ns_cycles("init_delay", t.init_delay_ns, hz)?,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.cas_latency, 2 | 3) {
            return Err(ConfigError::UnsupportedCasLatency(self.cas_latency));
        }
        // The auto-precharge of a read starts the tick after the Read command; the next
        // Bank-Activate can follow CL + 2 ticks later.
        if self.precharge_to_active > self.cas_latency + 1 {
            return Err(ConfigError::InconsistentTiming(
                "tRP exceeds CAS latency + 1, a read would complete before its bank is precharged",
            ));
        }
        if self.refresh_interval_cycles > u32::MAX / 2 {
            return Err(ConfigError::CycleOverflow {
                name: "refresh_interval",
                cycles: self.refresh_interval_cycles as u64,
            });
        }
        let longest = self.longest_operation_cycles();
        if self.refresh_interval_cycles <= 2 * (longest + 2) {
            return Err(ConfigError::RefreshIntervalTooShort {
                interval: self.refresh_interval_cycles,
                longest,
            });
        }
        // A reset may land inside a refresh; Precharge-All must not reach the device before tRC.
        if self.init_delay_cycles < longest {
            return Err(ConfigError::InitDelayTooShort {
                init: self.init_delay_cycles,
                longest,
            });
        }
        Ok(())
    }

    /// Precharge-to-activate delay (tRP).
    pub const fn precharge_to_active(&self) -> u32 {
        self.precharge_to_active
    }

    /// Auto-refresh period (tRC).
    pub const fn refresh_cycle(&self) -> u32 {
        self.refresh_cycle
    }

    /// Mode-register-set delay (tMRD).
    pub const fn mode_reg_set_delay(&self) -> u32 {
        self.mode_reg_set_delay
    }

    /// Activate-to-read/write delay (tRCD).
    pub const fn activate_to_rw(&self) -> u32 {
        self.activate_to_rw
    }

    /// CAS latency.
    pub const fn cas_latency(&self) -> u32 {
        self.cas_latency
    }

    /// Write recovery (tWR).
    pub const fn write_recovery(&self) -> u32 {
        self.write_recovery
    }

    /// Cycles between scheduled refreshes.
    pub const fn refresh_interval_cycles(&self) -> u32 {
        self.refresh_interval_cycles
    }

    /// Power-up delay in cycles.
    pub const fn init_delay_cycles(&self) -> u32 {
        self.init_delay_cycles
    }

    /// Command offsets of the power-up configuration sequence.
    pub const fn config_offsets(&self) -> ConfigOffsets {
        let first_refresh = self.precharge_to_active;
        let second_refresh = first_refresh + self.refresh_cycle;
        let mode_register = second_refresh + self.refresh_cycle;
        ConfigOffsets {
            first_refresh,
            second_refresh,
            mode_register,
            ready: mode_register + self.mode_reg_set_delay,
        }
    }

    /// Read state cycle at which the sampled word is latched and the read completes.
    pub const fn read_complete_at(&self) -> u32 {
        self.activate_to_rw + self.cas_latency + 1
    }

    /// Write state cycle at which the write (including auto-precharge) completes.
    pub const fn write_complete_at(&self) -> u32 {
        self.activate_to_rw + self.write_recovery + self.precharge_to_active + 1
    }

    /// Refresh state cycle at which the refresh completes.
    pub const fn refresh_complete_at(&self) -> u32 {
        self.refresh_cycle
    }

    /// Ticks spent busy by the longest host-visible operation, including the accepting tick.
    pub const fn longest_operation_cycles(&self) -> u32 {
        let read = self.read_complete_at();
        let write = self.write_complete_at();
        let refresh = self.refresh_complete_at();
        let max = if read > write { read } else { write };
        (if max > refresh { max } else { refresh }) + 2
    }

    /// Saturation point of the refresh counter.
    pub const fn refresh_counter_cap(&self) -> u32 {
        2 * self.refresh_interval_cycles - 2
    }

    /// Counter value from which a due refresh preempts host requests.
    pub const fn urgent_refresh_threshold(&self) -> u32 {
        let guard = self.longest_operation_cycles() + 2;
        let threshold = self.refresh_counter_cap().saturating_sub(guard);
        if threshold > self.refresh_interval_cycles {
            threshold
        } else {
            self.refresh_interval_cycles
        }
    }

    /// Ticks from reset until the controller first reports ready.
    ///
    /// One tick registers the power-on pulse, one tick moves Init to Config.
    pub const fn startup_cycles(&self) -> u64 {
        self.init_delay_cycles as u64 + self.config_offsets().ready as u64 + 2
    }
}

/// Converts a nanosecond delay into whole cycles, rounding up.
pub const fn ns_to_cycles(ns: u64, frequency_hz: u64) -> u64 {
    (ns as u128 * frequency_hz as u128).div_ceil(NS_PER_SECOND as u128) as u64
}

fn ns_cycles(name: &'static str, ns: u64, frequency_hz: u64) -> Result<u32, ConfigError> {
    let cycles = ns_to_cycles(ns, frequency_hz);
    let cycles = u32::try_from(cycles).map_err(|_| ConfigError::CycleOverflow { name, cycles })?;
    nonzero(name, cycles)
}

fn nonzero(name: &'static str, cycles: u32) -> Result<u32, ConfigError> {
    if cycles == 0 {
        Err(ConfigError::ZeroCycles { name })
    } else {
        Ok(cycles)
    }
}
