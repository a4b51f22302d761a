use sdramctl_core::Config;
use sdramctl_core::Testbench;
use sdramctl_core::controller::command::Command;
use sdramctl_core::sim::testbench::TraceEntry;
use tracing_subscriber::EnvFilter;

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 100 MHz default grade with a 100-cycle power-up delay and a 200-cycle refresh interval.
///
/// Derived counts: tRP 2, tRC 7, tRCD 2, tMRD 2, CL 2, tWR 2.
pub fn fast_config() -> Config {
    let mut config = Config::default();
    config.timing.init_delay_ns = 1_000;
    config.timing.refresh_interval_ns = 2_000;
    config
}

/// A 1 GHz grade where every nanosecond value equals its cycle count.
pub fn one_ns_config() -> Config {
    let mut config = Config::default();
    config.clock.frequency_hz = 1_000_000_000;
    config.timing.t_rp_ns = 3;
    config.timing.t_rc_ns = 9;
    config.timing.t_rcd_ns = 4;
    config.timing.cas_latency = 3;
    config.timing.t_mrd_cycles = 2;
    config.timing.t_wr_cycles = 2;
    config.timing.refresh_interval_ns = 300;
    config.timing.init_delay_ns = 50;
    config
}

/// A traced testbench.
pub struct TestContext {
    pub bench: Testbench,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Fast config with command tracing enabled.
    pub fn new() -> Self {
        Self::with_config(fast_config())
    }

    pub fn with_config(mut config: Config) -> Self {
        init_logging();
        config.trace.commands = true;
        let bench = Testbench::new(&config).unwrap();
        Self { bench }
    }

    /// Runs power-up and configuration to completion.
    pub fn ready(mut self) -> Self {
        let _ = self.bench.wait_ready().unwrap();
        self
    }

    /// Commands recorded so far, filtered to `command`.
    pub fn commands(&self, command: Command) -> Vec<TraceEntry> {
        self.bench
            .trace()
            .iter()
            .filter(|e| e.command == command)
            .copied()
            .collect()
    }

    /// Index into the trace where the next operation's commands will start.
    pub fn mark(&self) -> usize {
        self.bench.trace().len()
    }

    /// Commands recorded since `mark`.
    pub fn since(&self, mark: usize) -> Vec<TraceEntry> {
        self.bench.trace()[mark..].to_vec()
    }
}
