//! SDRAM controller CLI.
//!
//! This binary drives the controller against the behavioral device model. It performs:
//! 1. **Timing:** Print the cycle counts derived from a configuration.
//! 2. **Run:** Write a deterministic pseudo-random byte pattern, read it back, and report
//!    mismatches and statistics.
//! 3. **Trace:** Print the device command stream from reset.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{fs, process};

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sdramctl_core::common::error::SimError;
use sdramctl_core::stats::STATS_SECTIONS;
use sdramctl_core::{Config, Testbench, TimingParameters};

#[derive(Parser, Debug)]
#[command(
    name = "sdramctl",
    author,
    version,
    about = "Cycle-accurate single-byte SDRAM controller",
    long_about = "Inspect timing, run read-back workloads, or trace the command stream of a \
                  single-byte SDR SDRAM controller against a behavioral device model.\n\n\
                  Examples:\n  sdramctl timing\n  sdramctl run --ops 4096 --seed 7 --sections summary,refresh\n  \
                  sdramctl trace --config sdram.json --cycles 25000\n\n\
                  Set RUST_LOG=debug to see state transitions."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the derived timing table.
    Timing {
        /// JSON configuration file (defaults to the built-in 100 MHz grade).
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a pseudo-random pattern and read it back.
    Run {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of bytes written (and read back).
        #[arg(long, default_value_t = 256)]
        ops: u32,

        /// Seed of the address/data pattern.
        #[arg(long, default_value_t = 1)]
        seed: u32,

        /// Print statistics as JSON instead of the text report.
        #[arg(long)]
        json: bool,

        /// Report sections to print (comma separated); all sections when omitted.
        #[arg(
            long,
            value_delimiter = ',',
            value_parser = PossibleValuesParser::new(STATS_SECTIONS.iter().copied())
        )]
        sections: Vec<String>,
    },

    /// Print every device command issued from reset.
    Trace {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Ticks to simulate (defaults to power-up plus one refresh interval).
        #[arg(long)]
        cycles: Option<u64>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Timing { config } => cmd_timing(config.as_deref()),
        Commands::Run {
            config,
            ops,
            seed,
            json,
            sections,
        } => cmd_run(config.as_deref(), ops, seed, json, &sections),
        Commands::Trace { config, cycles } => cmd_trace(config.as_deref(), cycles),
    };

    if let Err(message) = result {
        error!("{message}");
        eprintln!("error: {message}");
        process::exit(1);
    }
}

/// Loads `path` as JSON, or returns the default configuration.
fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text =
        fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let config = Config::from_json(&text).map_err(|e| e.to_string())?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}

fn cmd_timing(path: Option<&Path>) -> Result<(), String> {
    let config = load_config(path)?;
    let timing = TimingParameters::from_config(&config).map_err(|e| e.to_string())?;
    let offsets = timing.config_offsets();

    println!("clock                    {} Hz", config.clock.frequency_hz);
    println!("tRP                      {}", timing.precharge_to_active());
    println!("tRC                      {}", timing.refresh_cycle());
    println!("tMRD                     {}", timing.mode_reg_set_delay());
    println!("tRCD                     {}", timing.activate_to_rw());
    println!("CL                       {}", timing.cas_latency());
    println!("tWR                      {}", timing.write_recovery());
    println!("refresh_interval         {}", timing.refresh_interval_cycles());
    println!("init_delay               {}", timing.init_delay_cycles());
    println!("----------------------------------------------------------");
    println!(
        "config                   PRE@0 REF@{} REF@{} MRS@{} ready@{}",
        offsets.first_refresh, offsets.second_refresh, offsets.mode_register, offsets.ready
    );
    println!("read_complete            {}", timing.read_complete_at());
    println!("write_complete           {}", timing.write_complete_at());
    println!("refresh_complete         {}", timing.refresh_complete_at());
    println!("startup                  {}", timing.startup_cycles());
    Ok(())
}

/// Xorshift32 pattern generator; deterministic for a given seed.
struct Pattern(u32);

impl Pattern {
    const fn new(seed: u32) -> Self {
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    const fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.0 = x;
        x
    }
}

fn cmd_run(
    path: Option<&Path>,
    ops: u32,
    seed: u32,
    json: bool,
    sections: &[String],
) -> Result<(), String> {
    let config = load_config(path)?;
    let mut bench = Testbench::new(&config).map_err(|e| e.to_string())?;
    let capacity = bench.controller().address_map().capacity_bytes();
    let word_mask = (capacity - 1) as u32 & !0b11;

    let _ = bench.wait_ready().map_err(|e| e.to_string())?;

    let mut pattern = Pattern::new(seed);
    let mut expected: HashMap<u32, u8> = HashMap::new();
    let mut order = Vec::with_capacity(ops as usize);
    for i in 0..ops {
        // Cycle through all four lanes.
        let addr = (pattern.next_u32() & word_mask) | (i & 0b11);
        let data = pattern.next_u32() as u8;
        write(&mut bench, addr, data)?;
        let _ = expected.insert(addr, data);
        order.push(addr);
    }

    let mut mismatches = 0u64;
    for addr in order {
        let want = expected.get(&addr).copied().unwrap_or_default();
        let got = bench.read_byte(addr).map_err(|e| sim_error(&bench, &e))?;
        if got.byte != want {
            mismatches += 1;
            eprintln!(
                "mismatch at {addr:#08x}: wrote {want:#04x}, read {:#04x} (word {:#010x})",
                got.byte, got.word
            );
        }
    }

    let stats = bench.controller().stats();
    let device = bench.device().counters();
    if json {
        let report = serde_json::json!({
            "ops": ops,
            "seed": seed,
            "mismatches": mismatches,
            "controller": stats,
            "device": {
                "activates": device.activates,
                "reads": device.reads,
                "writes": device.writes,
                "refreshes": device.refreshes,
                "longest_refresh_gap": device.longest_refresh_gap,
            },
        });
        let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{text}");
    } else {
        stats.print_sections(sections);
        println!("device.refreshes         {}", device.refreshes);
        println!("device.refresh_gap_max   {} cycles", device.longest_refresh_gap);
        println!("mismatches               {mismatches}");
    }

    if mismatches > 0 {
        return Err(format!("{mismatches} of {ops} bytes read back incorrectly"));
    }
    Ok(())
}

fn write(bench: &mut Testbench, addr: u32, data: u8) -> Result<(), String> {
    bench
        .write_byte(addr, data)
        .map_err(|e| sim_error(bench, &e))
}

fn sim_error(bench: &Testbench, e: &SimError) -> String {
    format!(
        "{e} (controller state {}, cycle {})",
        bench.controller().state(),
        bench.controller().cycle()
    )
}

fn cmd_trace(path: Option<&Path>, cycles: Option<u64>) -> Result<(), String> {
    let mut config = load_config(path)?;
    config.trace.commands = true;
    let mut bench = Testbench::new(&config).map_err(|e| e.to_string())?;
    let timing = *bench.controller().timing();
    let cycles = cycles.unwrap_or_else(|| {
        timing.startup_cycles() + u64::from(timing.refresh_interval_cycles())
    });

    bench.run(cycles).map_err(|e| sim_error(&bench, &e))?;

    println!("{:>10}  {:<4} {:>4} {:>6} {:>4}", "cycle", "cmd", "bank", "addr", "dqm");
    for entry in bench.trace() {
        println!(
            "{:>10}  {:<4} {:>4} {:>#6x} {:>#4b}",
            entry.cycle, entry.command, entry.bank, entry.address, entry.dqm
        );
    }
    Ok(())
}
