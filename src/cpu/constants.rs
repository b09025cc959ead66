/// Name the CPU collector registers under
pub const COLLECTOR_NAME: &str = "cpu";

/// Number of time-accounting states the kernel tracks per CPU
pub const CPU_TIME_FIELDS: usize = 5;

/// Metric name component, qualified as `node_cpu`
pub const METRIC_NAME: &str = "cpu";

/// Help text attached to the CPU time metric
pub const METRIC_HELP: &str = "Seconds the cpus spent in each mode.";

/// sysctl node holding the statclock frequency in ticks per second
pub const SYSCTL_CPUTIMER_FREQ: &str = "kern.cputimer.freq";

/// sysctl node holding the per-CPU `kinfo_cputime` array
pub const SYSCTL_CPUTIME: &str = "kern.cputime";
