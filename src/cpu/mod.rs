//! # CPU Module
//!
//! Per-core CPU time accounting for DragonFly BSD.
//!
//! The kernel attributes every statclock tick to one of five states per CPU
//! (`user`, `nice`, `sys`, `intr`, `idle`). [`CpuCollector`] reads those raw
//! accumulators once per collection cycle, converts them to seconds using the
//! statclock frequency from the same query, and emits one counter sample per
//! (core, state) pair with labels `cpu="cpu<i>"` and `mode=<state>`. The
//! counters are the kernel's own monotonically non-decreasing accumulators;
//! rate computation belongs to the scraping backend.
//!
//! ## Features
//!
//! * One sample per (core, state), cores ascending, state order fixed
//! * Single per-cycle timer frequency for every conversion in the cycle
//! * Strict frame validation: value count must match the reported CPU count,
//!   every counter must be a finite non-negative number
//! * Pluggable [`CpuTimeSource`] so the decode logic tests on any platform
//!
//! ## Example
//!
//! ```no_run
//! use dragonfly_metrics::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let cpu = CpuCollector::new()?;
//!
//!     let mut samples: Vec<Sample> = Vec::new();
//!     cpu.update(&mut samples)?;
//!
//!     for sample in &samples {
//!         println!(
//!             "{}{{cpu={}, mode={}}} {}",
//!             sample.desc().fq_name(),
//!             sample.label_values()[0],
//!             sample.label_values()[1],
//!             sample.value(),
//!         );
//!     }
//!     Ok(())
//! }
//! ```

mod constants;
mod source;
mod types;

pub use constants::*;
#[cfg(target_os = "dragonfly")]
pub use source::SysctlCpuTimeSource;
pub use source::CpuTimeSource;
pub use types::{CpuState, RawCounterFrame};

use std::fmt;
use std::sync::Arc;

use crate::collector::Collector;
use crate::error::{Error, Result};
use crate::metrics::{Desc, MetricKind, Sample, SampleSink, NAMESPACE};

/// Collector for per-core CPU time accounting counters.
///
/// Construction allocates the metric descriptor once; the only state carried
/// across cycles is that immutable metadata, so consecutive cycles over
/// unchanged kernel counters produce identical samples.
pub struct CpuCollector {
    desc: Arc<Desc>,
    source: Box<dyn CpuTimeSource>,
}

impl CpuCollector {
    /// Creates a collector backed by the platform sysctl binding.
    #[cfg(target_os = "dragonfly")]
    pub fn new() -> Result<Self> {
        Ok(Self::with_source(Box::new(SysctlCpuTimeSource::new())))
    }

    /// Creates a collector backed by the platform sysctl binding.
    ///
    /// Only the DragonFly binding exists; on other targets construction
    /// reports the platform as unavailable. Use [`CpuCollector::with_source`]
    /// to drive the collector from a custom source.
    #[cfg(not(target_os = "dragonfly"))]
    pub fn new() -> Result<Self> {
        Err(Error::not_available(
            "CPU time accounting requires the DragonFly sysctl interface",
        ))
    }

    /// Creates a collector reading from `source` instead of the platform
    /// binding.
    pub fn with_source(source: Box<dyn CpuTimeSource>) -> Self {
        Self {
            desc: Arc::new(Desc::new(NAMESPACE, "", METRIC_NAME, METRIC_HELP, &["cpu", "mode"])),
            source,
        }
    }

    /// The descriptor every sample of this collector is emitted against.
    pub fn desc(&self) -> &Desc {
        &self.desc
    }
}

impl fmt::Debug for CpuCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CpuCollector").field("desc", &self.desc).finish_non_exhaustive()
    }
}

impl Collector for CpuCollector {
    fn name(&self) -> &'static str {
        COLLECTOR_NAME
    }

    /// Runs one collection cycle.
    ///
    /// The frame is validated before any emission begins: an unusable timer
    /// frequency or a value count that does not match the reported CPU count
    /// aborts the cycle with nothing emitted. Individual counter values are
    /// validated as they are converted, so a bad value mid-frame aborts the
    /// remainder while samples already emitted stay emitted; no value is ever
    /// fabricated or zero-filled in place of one that failed validation.
    fn update(&self, sink: &mut dyn SampleSink) -> Result<()> {
        let frame = self.source.cpu_times()?;

        // The same frequency divides every value in the cycle. Zero is a
        // kernel-state fault, not a denominator.
        if !frame.frequency.is_finite() || frame.frequency <= 0.0 {
            return Err(Error::system(format!(
                "timer frequency {} is unusable as a divisor",
                frame.frequency
            )));
        }

        if frame.values.len() != frame.expected_values() {
            return Err(Error::invalid_data(format!(
                "expected {} counter values for {} cpus, got {}",
                frame.expected_values(),
                frame.cpus,
                frame.values.len()
            )));
        }

        for (index, raw) in frame.values.iter().enumerate() {
            let cpu = index / CPU_TIME_FIELDS;
            let state = CpuState::ALL[index % CPU_TIME_FIELDS];

            if !raw.is_finite() || *raw < 0.0 {
                return Err(Error::invalid_data(format!(
                    "cpu{cpu} {} counter is not a non-negative number: {raw}",
                    state.kernel_field()
                )));
            }

            let seconds = raw / frame.frequency;
            let sample = Sample::new(
                self.desc.clone(),
                MetricKind::Counter,
                seconds,
                vec![format!("cpu{cpu}"), state.mode_label().to_string()],
            )?;
            sink.emit(sample)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::source::MockCpuTimeSource;
    use super::*;

    fn frame(cpus: usize, frequency: f64, values: Vec<f64>) -> RawCounterFrame {
        RawCounterFrame { cpus, frequency, values }
    }

    fn collector_for(frame: RawCounterFrame, cycles: usize) -> CpuCollector {
        let mut source = MockCpuTimeSource::new();
        source
            .expect_cpu_times()
            .times(cycles)
            .returning(move || Ok(frame.clone()));
        CpuCollector::with_source(Box::new(source))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_descriptor() {
        let collector = CpuCollector::with_source(Box::new(MockCpuTimeSource::new()));
        assert_eq!(collector.desc().fq_name(), "node_cpu");
        assert_eq!(collector.desc().help(), "Seconds the cpus spent in each mode.");
        assert_eq!(collector.desc().variable_labels(), &["cpu".to_string(), "mode".to_string()]);
        assert_eq!(collector.name(), "cpu");
    }

    #[test]
    fn test_two_cores_concrete_values() {
        let collector = collector_for(
            frame(
                2,
                100.0,
                vec![
                    500.0, 0.0, 200.0, 10.0, 9300.0, // cpu0
                    400.0, 0.0, 150.0, 5.0, 9445.0, // cpu1
                ],
            ),
            1,
        );

        let mut samples: Vec<Sample> = Vec::new();
        collector.update(&mut samples).unwrap();

        let expected = [
            ("cpu0", "user", 5.0),
            ("cpu0", "nice", 0.0),
            ("cpu0", "sys", 2.0),
            ("cpu0", "interrupt", 0.1),
            ("cpu0", "idle", 93.0),
            ("cpu1", "user", 4.0),
            ("cpu1", "nice", 0.0),
            ("cpu1", "sys", 1.5),
            ("cpu1", "interrupt", 0.05),
            ("cpu1", "idle", 94.45),
        ];

        assert_eq!(samples.len(), expected.len());
        for (sample, (cpu, mode, seconds)) in samples.iter().zip(expected) {
            assert_eq!(sample.desc().fq_name(), "node_cpu");
            assert_eq!(sample.kind(), MetricKind::Counter);
            assert_eq!(sample.label_values(), &[cpu.to_string(), mode.to_string()]);
            assert_close(sample.value(), seconds);
        }
    }

    #[test]
    fn test_ordering_core_ascending_state_fixed() {
        let values: Vec<f64> = (0..20).map(|v| v as f64).collect();
        let collector = collector_for(frame(4, 100.0, values), 1);

        let mut samples: Vec<Sample> = Vec::new();
        collector.update(&mut samples).unwrap();
        assert_eq!(samples.len(), 20);

        let labels: Vec<(String, String)> = samples
            .iter()
            .map(|s| (s.label_values()[0].clone(), s.label_values()[1].clone()))
            .collect();

        let mut expected = Vec::new();
        for cpu in 0..4 {
            for mode in ["user", "nice", "sys", "interrupt", "idle"] {
                expected.push((format!("cpu{cpu}"), mode.to_string()));
            }
        }
        assert_eq!(labels, expected);
    }

    #[test]
    fn test_zero_cpus_is_empty_not_an_error() {
        let collector = collector_for(frame(0, 100.0, Vec::new()), 1);

        let mut samples: Vec<Sample> = Vec::new();
        collector.update(&mut samples).unwrap();
        assert!(samples.is_empty());
    }

    #[test]
    fn test_short_frame_is_never_padded() {
        // One value short of cpus * 5.
        let collector = collector_for(frame(2, 100.0, vec![1.0; 9]), 1);

        let mut samples: Vec<Sample> = Vec::new();
        let result = collector.update(&mut samples);
        assert!(matches!(result, Err(Error::InvalidData(_))));
        assert!(samples.is_empty());
    }

    #[test]
    fn test_bad_value_fails_fast_after_partial_emission() {
        let collector = collector_for(
            frame(1, 100.0, vec![100.0, 200.0, f64::NAN, 300.0, 400.0]),
            1,
        );

        let mut samples: Vec<Sample> = Vec::new();
        let result = collector.update(&mut samples);
        assert!(matches!(result, Err(Error::InvalidData(_))));

        // user and nice were emitted before the bad sys value; nothing was
        // fabricated for the remainder of the frame.
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label_values()[1], "user");
        assert_close(samples[0].value(), 1.0);
        assert_eq!(samples[1].label_values()[1], "nice");
        assert_close(samples[1].value(), 2.0);
    }

    #[test]
    fn test_negative_value_is_a_decode_failure() {
        let collector = collector_for(frame(1, 100.0, vec![-1.0, 0.0, 0.0, 0.0, 0.0]), 1);

        let mut samples: Vec<Sample> = Vec::new();
        assert!(matches!(collector.update(&mut samples), Err(Error::InvalidData(_))));
        assert!(samples.is_empty());
    }

    #[test]
    fn test_query_failure_emits_nothing() {
        let mut source = MockCpuTimeSource::new();
        source
            .expect_cpu_times()
            .times(1)
            .returning(|| Err(Error::system("could not retrieve CPU times")));
        let collector = CpuCollector::with_source(Box::new(source));

        let mut samples: Vec<Sample> = Vec::new();
        assert!(matches!(collector.update(&mut samples), Err(Error::System(_))));
        assert!(samples.is_empty());
    }

    #[test]
    fn test_zero_frequency_is_a_query_fault() {
        let collector = collector_for(frame(1, 0.0, vec![1.0; 5]), 1);

        let mut samples: Vec<Sample> = Vec::new();
        assert!(matches!(collector.update(&mut samples), Err(Error::System(_))));
        assert!(samples.is_empty());
    }

    #[test]
    fn test_intr_surfaces_as_interrupt_for_every_core() {
        let collector = collector_for(frame(3, 100.0, vec![0.0; 15]), 1);

        let mut samples: Vec<Sample> = Vec::new();
        collector.update(&mut samples).unwrap();

        let modes: Vec<&str> = samples.iter().map(|s| s.label_values()[1].as_str()).collect();
        assert!(!modes.contains(&"intr"));
        assert_eq!(modes.iter().filter(|m| **m == "interrupt").count(), 3);
    }

    #[test]
    fn test_consecutive_cycles_are_identical() {
        let collector = collector_for(
            frame(2, 100.0, vec![500.0, 0.0, 200.0, 10.0, 9300.0, 400.0, 0.0, 150.0, 5.0, 9445.0]),
            2,
        );

        let mut first: Vec<Sample> = Vec::new();
        collector.update(&mut first).unwrap();
        let mut second: Vec<Sample> = Vec::new();
        collector.update(&mut second).unwrap();

        assert_eq!(first, second);
    }
}
