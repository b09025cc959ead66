//! Dragonfly Metrics - A Rust library for collecting DragonFly BSD system metrics
//!
//! This crate reads kernel time-accounting counters through `sysctl(3)` and
//! exposes them as labeled, counter-typed metric samples suitable for scraping
//! by a monitoring backend.
//!
//! # Features
//!
//! - **CPU Metrics**: per-core CPU time accounting (`user`, `nice`, `sys`,
//!   `interrupt`, `idle`) converted from raw kernel ticks to seconds
//! - **Metric Primitives**: descriptors, counter samples, and pluggable sinks
//! - **Collector Registry**: explicit name-to-factory composition for wiring
//!   collectors into a scrape loop
//!
//! # Examples
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
//!         println!("{} {:?} = {}", sample.desc().fq_name(), sample.label_values(), sample.value());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Handling
//!
//! The crate uses a single [`Error`] type. Kernel query failures (a sysctl
//! node that cannot be read, a short read, a zero timer frequency) surface as
//! [`Error::System`]; malformed counter data (a value count that does not
//! match the reported CPU count, a non-finite or negative counter) surfaces
//! as [`Error::InvalidData`]. Collectors never log, retry, or suppress
//! errors internally; a failed cycle is reported whole to the caller.
//!
//! # Thread Safety
//!
//! Collectors hold no mutable state between cycles, so a collector instance
//! may be shared across threads. Calls to [`Collector::update`] on the same
//! instance should still be serialized by the scrape loop, since the
//! underlying kernel query is a blocking system call sequence.
//!
//! [`Collector::update`]: crate::collector::Collector::update

mod error;

pub use error::{Error, Result};

// Public modules
pub mod collector;
#[cfg(feature = "cpu")]
pub mod cpu;
pub mod metrics;

// Private modules
mod utils;

/// Re-export common types for convenience
pub mod prelude {
    pub use crate::collector::{collect_all, Collector, CollectorRegistry};
    #[cfg(feature = "cpu")]
    pub use crate::cpu::{CpuCollector, CpuState};
    pub use crate::metrics::{Desc, MetricKind, Sample, SampleSink};
    pub use crate::Error;
    pub use crate::Result;
}
