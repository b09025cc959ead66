//! Platform-query boundary for CPU time accounting.
//!
//! [`CpuTimeSource`] is the single seam between the portable decode/convert/
//! emit logic and the kernel. One call per collection cycle returns a
//! structured [`RawCounterFrame`] (CPU count, statclock frequency, flat
//! counter values) or a typed failure; the source never returns sentinel
//! values for errors. The DragonFly binding reads the frame out of the
//! sysctl MIB tree; tests substitute a mock.

#[cfg(test)]
use mockall::automock;

use crate::error::Result;

use super::types::RawCounterFrame;

/// Kernel query issued once per collection cycle.
#[cfg_attr(test, automock)]
pub trait CpuTimeSource: Send + Sync {
    /// Returns the logical CPU count, the timer frequency, and the per-CPU
    /// raw tick accumulators observed by a single query.
    ///
    /// A frequency of zero is kernel-state or driver fault territory and
    /// must fail the query here rather than surface as a divisor downstream.
    fn cpu_times(&self) -> Result<RawCounterFrame>;
}

#[cfg(target_os = "dragonfly")]
pub use self::sysctl::SysctlCpuTimeSource;

#[cfg(target_os = "dragonfly")]
mod sysctl {
    use std::ffi::CString;

    use once_cell::sync::Lazy;

    use crate::cpu::constants::{CPU_TIME_FIELDS, SYSCTL_CPUTIME, SYSCTL_CPUTIMER_FREQ};
    use crate::cpu::types::RawCounterFrame;
    use crate::error::{Error, Result};
    use crate::utils::bindings::{kinfo_cputime, sysctl_array_by_name, sysctl_i32, sysctl_long_by_name};

    use super::CpuTimeSource;

    static CPUTIMER_FREQ_NODE: Lazy<CString> =
        Lazy::new(|| CString::new(SYSCTL_CPUTIMER_FREQ).unwrap());
    static CPUTIME_NODE: Lazy<CString> = Lazy::new(|| CString::new(SYSCTL_CPUTIME).unwrap());

    /// Reads CPU time counters from the DragonFly sysctl MIB tree:
    /// `hw.ncpu` for the CPU count, `kern.cputimer.freq` for the statclock
    /// frequency, and the `kern.cputime` array of `kinfo_cputime` records.
    #[derive(Debug, Default)]
    pub struct SysctlCpuTimeSource;

    impl SysctlCpuTimeSource {
        pub fn new() -> Self {
            Self
        }
    }

    impl CpuTimeSource for SysctlCpuTimeSource {
        fn cpu_times(&self) -> Result<RawCounterFrame> {
            let ncpu = sysctl_i32(&[libc::CTL_HW, libc::HW_NCPU], "hw.ncpu")?;
            if ncpu < 0 {
                return Err(Error::system(format!("hw.ncpu reported {ncpu}")));
            }
            let cpus = ncpu as usize;

            let frequency = sysctl_long_by_name(&CPUTIMER_FREQ_NODE)?;
            if frequency <= 0 {
                return Err(Error::system(format!(
                    "{SYSCTL_CPUTIMER_FREQ} reported {frequency} ticks per second"
                )));
            }

            if cpus == 0 {
                return Ok(RawCounterFrame {
                    cpus: 0,
                    frequency: frequency as f64,
                    values: Vec::new(),
                });
            }

            let times: Vec<kinfo_cputime> = sysctl_array_by_name(&CPUTIME_NODE, cpus)?;
            if times.len() != cpus {
                return Err(Error::invalid_data(format!(
                    "{SYSCTL_CPUTIME} returned {} records for {cpus} cpus",
                    times.len()
                )));
            }

            let mut values = Vec::with_capacity(cpus * CPU_TIME_FIELDS);
            for time in &times {
                values.push(time.cp_user as f64);
                values.push(time.cp_nice as f64);
                values.push(time.cp_sys as f64);
                values.push(time.cp_intr as f64);
                values.push(time.cp_idle as f64);
            }

            Ok(RawCounterFrame { cpus, frequency: frequency as f64, values })
        }
    }
}
