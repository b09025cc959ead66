//! Collector trait and explicit registry wiring.
//!
//! A [`Collector`] turns one kernel query into a stream of metric samples.
//! Collectors are composed into a scrape loop through a
//! [`CollectorRegistry`]: the surrounding program registers each factory
//! under a stable name at startup, builds the collectors it wants, and drives
//! them once per scrape with [`collect_all`]. There is no implicit global
//! registration; activation is an explicit call.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::warn;

use crate::error::{Error, Result};
use crate::metrics::SampleSink;

/// A source of metric samples, invoked once per collection cycle.
pub trait Collector: Send + Sync {
    /// Stable name this collector registers under, e.g. `"cpu"`
    fn name(&self) -> &'static str;

    /// Runs one collection cycle, streaming samples into `sink`.
    ///
    /// A returned error covers the whole cycle; samples emitted before the
    /// failure point are not retracted. Collectors do not log or retry
    /// internally.
    fn update(&self, sink: &mut dyn SampleSink) -> Result<()>;
}

/// Constructor associated with a collector name.
pub type CollectorFactory = fn() -> Result<Box<dyn Collector>>;

/// Explicit name-to-factory map, populated at startup.
///
/// Registration is last-wins: registering a name twice replaces the earlier
/// factory.
#[derive(Default)]
pub struct CollectorRegistry {
    factories: RwLock<HashMap<&'static str, CollectorFactory>>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `name` with `factory`.
    pub fn register(&self, name: &'static str, factory: CollectorFactory) {
        self.factories.write().insert(name, factory);
    }

    /// Registered collector names, sorted for stable iteration.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.read().keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Builds the collector registered under `name`.
    pub fn build(&self, name: &str) -> Result<Box<dyn Collector>> {
        let factory = *self
            .factories
            .read()
            .get(name)
            .ok_or_else(|| Error::not_available(format!("no collector registered as {name:?}")))?;
        factory()
    }

    /// Builds every registered collector, in name order.
    ///
    /// Construction failures are reported per name rather than aborting the
    /// rest, so one unavailable collector does not take down the scrape loop.
    pub fn build_all(&self) -> Vec<(&'static str, Result<Box<dyn Collector>>)> {
        self.names().into_iter().map(|name| (name, self.build(name))).collect()
    }
}

/// Registers the collectors this build of the crate provides.
pub fn register_platform_collectors(registry: &CollectorRegistry) {
    #[cfg(feature = "cpu")]
    registry.register(crate::cpu::COLLECTOR_NAME, || {
        let collector = crate::cpu::CpuCollector::new()?;
        Ok(Box::new(collector) as Box<dyn Collector>)
    });
    #[cfg(not(feature = "cpu"))]
    let _ = registry;
}

/// Outcome of one collector's cycle within a scrape.
#[derive(Debug)]
pub struct CollectorOutcome {
    pub name: &'static str,
    pub result: Result<()>,
}

impl CollectorOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Drives every collector through one cycle against `sink`.
///
/// Failures are isolated: a collector that errors is recorded (and logged at
/// warn level) without stopping the collectors after it.
pub fn collect_all(collectors: &[Box<dyn Collector>], sink: &mut dyn SampleSink) -> Vec<CollectorOutcome> {
    collectors
        .iter()
        .map(|collector| {
            let result = collector.update(sink);
            if let Err(err) = &result {
                warn!(collector = collector.name(), error = %err, "collection cycle failed");
            }
            CollectorOutcome { name: collector.name(), result }
        })
        .collect()
}
