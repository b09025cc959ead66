//! Metric primitives shared by all collectors.
//!
//! This module provides the narrow interface collectors emit through: an
//! immutable metric descriptor ([`Desc`]), a constructed observation
//! ([`Sample`]), and the output sink abstraction ([`SampleSink`]). A
//! collector allocates its descriptors once at construction and pushes one
//! sample per observation into the sink it is handed each cycle; rate
//! computation, exposition, and scheduling all live with the caller.

use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Namespace prepended to all fully-qualified metric names.
pub const NAMESPACE: &str = "node";

/// Joins the non-empty parts of a metric name with `_`.
///
/// Mirrors the usual exporter naming convention: `namespace_subsystem_name`,
/// with empty parts skipped.
pub fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// The kind of time series a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetricKind {
    /// Monotonically non-decreasing accumulator
    Counter,
    /// Point-in-time value that may go up or down
    Gauge,
}

/// Immutable metric metadata, created once per collector.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Desc {
    fq_name: String,
    help: String,
    variable_labels: Vec<String>,
}

impl Desc {
    /// Creates a descriptor with a fully-qualified name built from
    /// `(namespace, subsystem, name)`, a help string, and the ordered list
    /// of variable label names that every sample must provide values for.
    pub fn new(namespace: &str, subsystem: &str, name: &str, help: &str, variable_labels: &[&str]) -> Self {
        Self {
            fq_name: build_fq_name(namespace, subsystem, name),
            help: help.to_string(),
            variable_labels: variable_labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Fully-qualified metric name, e.g. `node_cpu`
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }

    /// Help text describing the metric
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Declared label names, in the order sample values must be given
    pub fn variable_labels(&self) -> &[String] {
        &self.variable_labels
    }
}

/// A single emitted observation: descriptor, kind, value, and one label
/// value per declared label name.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    desc: Arc<Desc>,
    kind: MetricKind,
    value: f64,
    label_values: Vec<String>,
}

impl Sample {
    /// Builds a sample against `desc`.
    ///
    /// Fails if the number of label values does not match the descriptor's
    /// declared labels, or if the value is not finite. Time-series consumers
    /// cannot process NaN or infinite counter values, so those are rejected
    /// here rather than emitted.
    pub fn new(desc: Arc<Desc>, kind: MetricKind, value: f64, label_values: Vec<String>) -> Result<Self> {
        if label_values.len() != desc.variable_labels.len() {
            return Err(Error::invalid_data(format!(
                "metric {} expects {} label values, got {}",
                desc.fq_name,
                desc.variable_labels.len(),
                label_values.len()
            )));
        }
        if !value.is_finite() {
            return Err(Error::invalid_data(format!(
                "metric {} sample value is not finite: {}",
                desc.fq_name, value
            )));
        }
        Ok(Self { desc, kind, value, label_values })
    }

    /// The descriptor this sample was emitted against
    pub fn desc(&self) -> &Desc {
        &self.desc
    }

    /// Counter or gauge semantics of this sample
    pub fn kind(&self) -> MetricKind {
        self.kind
    }

    /// The observed value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Label values, in the descriptor's declared label order
    pub fn label_values(&self) -> &[String] {
        &self.label_values
    }
}

/// Output sink collectors stream samples into.
///
/// Implemented for `Vec<Sample>` (appendable buffer) and
/// `std::sync::mpsc::Sender<Sample>` (channel to a scrape loop).
pub trait SampleSink {
    fn emit(&mut self, sample: Sample) -> Result<()>;
}

impl SampleSink for Vec<Sample> {
    fn emit(&mut self, sample: Sample) -> Result<()> {
        self.push(sample);
        Ok(())
    }
}

impl SampleSink for std::sync::mpsc::Sender<Sample> {
    fn emit(&mut self, sample: Sample) -> Result<()> {
        self.send(sample)
            .map_err(|_| Error::system("sample sink disconnected"))
    }
}
