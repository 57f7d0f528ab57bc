//! Recording sinks.
//!
//! Both sinks keep everything they receive behind a mutex and hand out
//! copies, so they can be shared with the code under test through an `Arc`
//! and inspected afterwards.

use ministry_telemetry::metrics::{MetricLabels, EVENTS_TOTAL, LABEL_EVENT_TYPE, LABEL_STATUS};
use ministry_telemetry::{AuditRecord, AuditSink, AuditStatus, MetricsSink};
use parking_lot::Mutex;

/// Audit sink that keeps every record in memory.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl RecordingAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every record, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Returns the status of every record, oldest first.
    #[must_use]
    pub fn statuses(&self) -> Vec<AuditStatus> {
        self.records.lock().iter().map(|r| r.status).collect()
    }

    /// Returns the most recent record.
    #[must_use]
    pub fn last(&self) -> Option<AuditRecord> {
        self.records.lock().last().cloned()
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Drops every record.
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl AuditSink for RecordingAuditSink {
    fn append(&self, record: AuditRecord) {
        self.records.lock().push(record);
    }
}

/// Kind of metric call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Histogram observation.
    Observe,
    /// Counter increment.
    Increment,
}

/// One call received by a [`RecordingMetricsSink`].
#[derive(Debug, Clone, PartialEq)]
pub struct MetricCall {
    /// Observation or increment.
    pub kind: MetricKind,
    /// Metric name.
    pub name: &'static str,
    /// Label pairs as passed in.
    pub labels: Vec<(&'static str, String)>,
    /// Observed value; `1.0` for increments.
    pub value: f64,
}

impl MetricCall {
    /// Returns the value of label `key`.
    #[must_use]
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if every pair in `expected` is present.
    #[must_use]
    pub fn has_labels(&self, expected: &[(&str, &str)]) -> bool {
        expected
            .iter()
            .all(|(key, value)| self.label(key) == Some(*value))
    }
}

/// Metrics sink that keeps every call in memory.
#[derive(Debug, Default)]
pub struct RecordingMetricsSink {
    calls: Mutex<Vec<MetricCall>>,
}

impl RecordingMetricsSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every call, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<MetricCall> {
        self.calls.lock().clone()
    }

    /// Counts increments of `name` carrying all of `labels`.
    #[must_use]
    pub fn count(&self, name: &str, labels: &[(&str, &str)]) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.kind == MetricKind::Increment && c.name == name && c.has_labels(labels))
            .count()
    }

    /// Returns the histogram observations of `name`.
    #[must_use]
    pub fn observations_of(&self, name: &str) -> Vec<MetricCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.kind == MetricKind::Observe && c.name == name)
            .cloned()
            .collect()
    }

    /// Returns the `status` label of every increment of `name`.
    #[must_use]
    pub fn status_labels(&self, name: &str) -> Vec<String> {
        self.increment_labels(name, LABEL_STATUS)
    }

    /// Returns the `event_type` label of every event increment.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.increment_labels(EVENTS_TOTAL, LABEL_EVENT_TYPE)
    }

    fn increment_labels(&self, name: &str, key: &str) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.kind == MetricKind::Increment && c.name == name)
            .filter_map(|c| c.label(key).map(str::to_string))
            .collect()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Drops every call.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl MetricsSink for RecordingMetricsSink {
    fn observe(&self, name: &'static str, labels: &MetricLabels, value: f64) {
        self.calls.lock().push(MetricCall {
            kind: MetricKind::Observe,
            name,
            labels: labels.to_vec(),
            value,
        });
    }

    fn increment(&self, name: &'static str, labels: &MetricLabels) {
        self.calls.lock().push(MetricCall {
            kind: MetricKind::Increment,
            name,
            labels: labels.to_vec(),
            value: 1.0,
        });
    }
}
