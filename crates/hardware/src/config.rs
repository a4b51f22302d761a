//! Configuration system for the SDRAM controller.
//!
//! This module defines the construction-time configuration of a controller instance. It provides:
//! 1. **Defaults:** Baseline clock, geometry, and timing grade (a 100 MHz, 8 MiB, 4-bank device).
//! 2. **Structures:** Hierarchical config for clock, geometry, timing, and tracing.
//!
//! Timing grades are given in nanoseconds where the data sheet does, and in cycles where the
//! data sheet does (tMRD, tWR, CAS latency). Conversion into cycle counts and validation happen
//! once, in [`TimingParameters::from_config`](crate::timing::TimingParameters::from_config).
//!
//! Configuration is supplied as JSON (e.g. from the CLI `--config` flag) or built with
//! `Config::default()`. Nothing here can be changed after a controller is constructed.

use serde::{Deserialize, Serialize};

use crate::common::error::ConfigError;

/// Default configuration constants.
///
/// These values describe a 2M x 32 SDRAM (4 banks x 2048 rows x 256 columns) at 100 MHz.
mod defaults {
    /// Controller clock (100 MHz).
    pub const CLOCK_HZ: u64 = 100_000_000;

    /// Bank address width (4 banks).
    pub const BANK_BITS: u32 = 2;

    /// Row address width (2048 rows).
    pub const ROW_BITS: u32 = 11;

    /// Column address width (256 columns).
    pub const COLUMN_BITS: u32 = 8;

    /// Precharge-to-activate delay (tRP).
    pub const T_RP_NS: u64 = 20;

    /// Refresh cycle time (tRC), also the auto-refresh period.
    pub const T_RC_NS: u64 = 70;

    /// Activate-to-read/write delay (tRCD).
    pub const T_RCD_NS: u64 = 20;

    /// Mode-register-set delay (tMRD).
    pub const T_MRD_CYCLES: u32 = 2;

    /// CAS latency at 100 MHz.
    pub const CAS_LATENCY: u32 = 2;

    /// Write recovery (tWR).
    pub const T_WR_CYCLES: u32 = 2;

    /// Average refresh interval (64 ms / 4096 rows, rounded down to 15 us).
    pub const REFRESH_INTERVAL_NS: u64 = 15_000;

    /// Power-up delay before the first command (200 us).
    pub const INIT_DELAY_NS: u64 = 200_000;
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Clock domain settings.
    #[serde(default)]
    pub clock: ClockConfig,
    /// Device address geometry.
    #[serde(default)]
    pub geometry: GeometryConfig,
    /// Device timing grade.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Simulation tracing.
    #[serde(default)]
    pub trace: TraceConfig,
}

impl Config {
    /// Parses a JSON configuration document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid JSON or has mistyped fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Clock domain configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClockConfig {
    /// Controller clock frequency in Hz.
    #[serde(default = "ClockConfig::default_frequency_hz")]
    pub frequency_hz: u64,
}

impl ClockConfig {
    const fn default_frequency_hz() -> u64 {
        defaults::CLOCK_HZ
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            frequency_hz: defaults::CLOCK_HZ,
        }
    }
}

/// Device address geometry.
///
/// The data bus is fixed at 32 bits (four byte lanes); only the address fields are configurable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GeometryConfig {
    /// Bank address width (BA pins).
    #[serde(default = "GeometryConfig::default_bank_bits")]
    pub bank_bits: u32,

    /// Row address width.
    #[serde(default = "GeometryConfig::default_row_bits")]
    pub row_bits: u32,

    /// Column address width.
    #[serde(default = "GeometryConfig::default_column_bits")]
    pub column_bits: u32,
}

impl GeometryConfig {
    const fn default_bank_bits() -> u32 {
        defaults::BANK_BITS
    }

    const fn default_row_bits() -> u32 {
        defaults::ROW_BITS
    }

    const fn default_column_bits() -> u32 {
        defaults::COLUMN_BITS
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            bank_bits: defaults::BANK_BITS,
            row_bits: defaults::ROW_BITS,
            column_bits: defaults::COLUMN_BITS,
        }
    }
}

/// Device timing grade.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TimingConfig {
    /// Precharge-to-activate delay (tRP) in nanoseconds.
    #[serde(default = "TimingConfig::default_t_rp_ns")]
    pub t_rp_ns: u64,

    /// Refresh cycle time (tRC) in nanoseconds.
    #[serde(default = "TimingConfig::default_t_rc_ns")]
    pub t_rc_ns: u64,

    /// Activate-to-read/write delay (tRCD) in nanoseconds.
    #[serde(default = "TimingConfig::default_t_rcd_ns")]
    pub t_rcd_ns: u64,

    /// Mode-register-set delay (tMRD) in cycles.
    #[serde(default = "TimingConfig::default_t_mrd_cycles")]
    pub t_mrd_cycles: u32,

    /// CAS latency in cycles (2 or 3).
    #[serde(default = "TimingConfig::default_cas_latency")]
    pub cas_latency: u32,

    /// Write recovery (tWR) in cycles.
    #[serde(default = "TimingConfig::default_t_wr_cycles")]
    pub t_wr_cycles: u32,

    /// Average refresh interval in nanoseconds.
    #[serde(default = "TimingConfig::default_refresh_interval_ns")]
    pub refresh_interval_ns: u64,

    /// Power-up delay in nanoseconds.
    #[serde(default = "TimingConfig::default_init_delay_ns")]
    pub init_delay_ns: u64,
}

impl TimingConfig {
    const fn default_t_rp_ns() -> u64 {
        defaults::T_RP_NS
    }

    const fn default_t_rc_ns() -> u64 {
        defaults::T_RC_NS
    }

    const fn default_t_rcd_ns() -> u64 {
        defaults::T_RCD_NS
    }

    const fn default_t_mrd_cycles() -> u32 {
        defaults::T_MRD_CYCLES
    }

    const fn default_cas_latency() -> u32 {
        defaults::CAS_LATENCY
    }

    const fn default_t_wr_cycles() -> u32 {
        defaults::T_WR_CYCLES
    }

    const fn default_refresh_interval_ns() -> u64 {
        defaults::REFRESH_INTERVAL_NS
    }

    const fn default_init_delay_ns() -> u64 {
        defaults::INIT_DELAY_NS
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            t_rp_ns: defaults::T_RP_NS,
            t_rc_ns: defaults::T_RC_NS,
            t_rcd_ns: defaults::T_RCD_NS,
            t_mrd_cycles: defaults::T_MRD_CYCLES,
            cas_latency: defaults::CAS_LATENCY,
            t_wr_cycles: defaults::T_WR_CYCLES,
            refresh_interval_ns: defaults::REFRESH_INTERVAL_NS,
            init_delay_ns: defaults::INIT_DELAY_NS,
        }
    }
}

/// Simulation tracing options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TraceConfig {
    /// Record every non-NOP device command issued by the controller.
    #[serde(default)]
    pub commands: bool,
}
