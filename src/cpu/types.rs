use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::constants::CPU_TIME_FIELDS;

/// CPU time-accounting states, in the kernel's fixed per-CPU order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CpuState {
    /// Time spent in user mode
    User,
    /// Time spent in user mode at reduced priority
    Nice,
    /// Time spent in kernel mode
    Sys,
    /// Time spent servicing interrupts
    Intr,
    /// Time spent idle
    Idle,
}

impl CpuState {
    /// All states, in the order the kernel reports them per CPU.
    pub const ALL: [CpuState; CPU_TIME_FIELDS] = [
        CpuState::User,
        CpuState::Nice,
        CpuState::Sys,
        CpuState::Intr,
        CpuState::Idle,
    ];

    /// Field name in the kernel's `kinfo_cputime` structure.
    pub fn kernel_field(&self) -> &'static str {
        match self {
            CpuState::User => "user",
            CpuState::Nice => "nice",
            CpuState::Sys => "sys",
            CpuState::Intr => "intr",
            CpuState::Idle => "idle",
        }
    }

    /// Exported `mode` label value. The kernel field `intr` surfaces as
    /// `interrupt`; all other states keep their kernel names.
    pub fn mode_label(&self) -> &'static str {
        match self {
            CpuState::Intr => "interrupt",
            other => other.kernel_field(),
        }
    }
}

impl fmt::Display for CpuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode_label())
    }
}

/// One collection cycle's raw kernel counters.
///
/// Ephemeral: produced by a single [`CpuTimeSource`] query and discarded
/// after decoding. `values` holds the per-CPU accumulators flattened in
/// [`CpuState::ALL`] order, CPUs ascending; a well-formed frame has exactly
/// `cpus * 5` values, which the collector checks rather than assumes.
///
/// [`CpuTimeSource`]: super::CpuTimeSource
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawCounterFrame {
    /// Number of logical CPUs reported by the same query
    pub cpus: usize,
    /// Statclock frequency in ticks per second, read once per cycle
    pub frequency: f64,
    /// Raw tick accumulators, `cpus * 5` of them when well-formed
    pub values: Vec<f64>,
}

impl RawCounterFrame {
    /// Number of values a well-formed frame must carry.
    pub fn expected_values(&self) -> usize {
        self.cpus * CPU_TIME_FIELDS
    }
}
