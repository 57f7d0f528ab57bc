//! Spell metrics.
//!
//! Every call that reaches the audit aspect produces one latency sample and
//! two counter increments, labeled by the call's [`Outcome`].
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `magic_spell_casts_total` | Counter | `spell_name`, `status` | Total count of spells cast |
//! | `magic_spell_cast_latency_seconds` | Histogram | `spell_name`, `status` | Spell execution latency |
//! | `magic_events_total` | Counter | `event_type` | Magic events, including security failures |
//!
//! The aspects never touch the `metrics` macros directly. They talk to a
//! [`MetricsSink`], which lets tests capture label arguments and lets a
//! service run with metrics switched off.
//!
//! # Example
//!
//! ```rust
//! use ministry_telemetry::metrics::{record_cast, NoopMetricsSink, Outcome};
//! use std::time::Duration;
//!
//! record_cast(&NoopMetricsSink, "Lumos", Outcome::Success, Duration::from_millis(3));
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram, Label};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use ministry_core::MinistryError;
use std::sync::OnceLock;
use std::time::Duration;

/// Counter of spells cast, by spell and status.
pub const SPELL_CASTS_TOTAL: &str = "magic_spell_casts_total";

/// Histogram of spell latency in seconds, by spell and status.
pub const SPELL_CAST_LATENCY_SECONDS: &str = "magic_spell_cast_latency_seconds";

/// Counter of magic events, by event type.
pub const EVENTS_TOTAL: &str = "magic_events_total";

/// Label carrying the spell name as requested.
pub const LABEL_SPELL_NAME: &str = "spell_name";

/// Label carrying the outcome status.
pub const LABEL_STATUS: &str = "status";

/// Label carrying the event type.
pub const LABEL_EVENT_TYPE: &str = "event_type";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Label pairs passed to a [`MetricsSink`].
pub type MetricLabels = [(&'static str, String)];

/// Classified outcome of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The command returned normally.
    Success,
    /// The call failed with a security failure.
    FailSecurity,
    /// The call failed for any other reason.
    FailLogic,
}

impl Outcome {
    /// Classifies a failure by its kind.
    #[must_use]
    pub const fn from_error(error: &MinistryError) -> Self {
        if error.is_security() {
            Self::FailSecurity
        } else {
            Self::FailLogic
        }
    }

    /// Classifies a call result.
    #[must_use]
    pub const fn of<T>(result: &Result<T, MinistryError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(e) => Self::from_error(e),
        }
    }

    /// Returns the `status` label value.
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::FailSecurity => "fail_security",
            Self::FailLogic => "fail_logic",
        }
    }

    /// Returns the `event_type` label value.
    #[must_use]
    pub const fn event_label(&self) -> &'static str {
        match self {
            Self::Success => "spell_success",
            Self::FailSecurity => "security_fail",
            Self::FailLogic => "spell_fail",
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Destination for metric observations.
///
/// Implementations must tolerate concurrent writers.
pub trait MetricsSink: Send + Sync {
    /// Records a histogram observation.
    fn observe(&self, name: &'static str, labels: &MetricLabels, value: f64);

    /// Increments a counter by one.
    fn increment(&self, name: &'static str, labels: &MetricLabels);
}

/// Forwards observations to the globally installed `metrics` recorder.
///
/// Without an installed recorder the `metrics` macros are no-ops, so this
/// sink is always safe to use.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetricsSink;

impl PrometheusMetricsSink {
    fn labels(labels: &MetricLabels) -> Vec<Label> {
        labels
            .iter()
            .map(|(key, value)| Label::new(*key, value.clone()))
            .collect()
    }
}

impl MetricsSink for PrometheusMetricsSink {
    fn observe(&self, name: &'static str, labels: &MetricLabels, value: f64) {
        histogram!(name, Self::labels(labels)).record(value);
    }

    fn increment(&self, name: &'static str, labels: &MetricLabels) {
        counter!(name, Self::labels(labels)).increment(1);
    }
}

/// Discards every observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn observe(&self, _name: &'static str, _labels: &MetricLabels, _value: f64) {}

    fn increment(&self, _name: &'static str, _labels: &MetricLabels) {}
}

/// Records one completed call.
///
/// Updates the following metrics:
/// - `magic_spell_cast_latency_seconds` (histogram observation)
/// - `magic_spell_casts_total` (incremented)
/// - `magic_events_total` (incremented)
pub fn record_cast(sink: &dyn MetricsSink, spell_name: &str, outcome: Outcome, latency: Duration) {
    let labels = [
        (LABEL_SPELL_NAME, spell_name.to_string()),
        (LABEL_STATUS, outcome.status_label().to_string()),
    ];
    sink.observe(SPELL_CAST_LATENCY_SECONDS, &labels, latency.as_secs_f64());
    sink.increment(SPELL_CASTS_TOTAL, &labels);
    sink.increment(
        EVENTS_TOTAL,
        &[(LABEL_EVENT_TYPE, outcome.event_label().to_string())],
    );
}

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for spell latency, in seconds.
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 2.5s
            latency_buckets: default_latency_buckets(),
        }
    }
}

/// Default latency buckets in seconds.
#[must_use]
pub fn default_latency_buckets() -> Vec<f64> {
    vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]
}

/// Metrics registry for rendering the Prometheus exposition.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with the given handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Returns the registry of the installed recorder, if any.
    #[must_use]
    pub fn global() -> Option<Self> {
        METRICS_HANDLE.get().cloned().map(Self::new)
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the Prometheus recorder.
///
/// Calling this more than once is harmless: the first installed recorder is
/// kept.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if the buckets are rejected or a
/// different global recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled || METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(SPELL_CAST_LATENCY_SECONDS.to_string()),
            &config.latency_buckets,
        )
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);

    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for all spell metrics.
pub fn register_metric_descriptions() {
    describe_counter!(SPELL_CASTS_TOTAL, "Total count of spells cast");
    describe_histogram!(
        SPELL_CAST_LATENCY_SECONDS,
        metrics::Unit::Seconds,
        "Spell execution latency (seconds)"
    );
    describe_counter!(
        EVENTS_TOTAL,
        "Magic event counter (including security failures)"
    );
}
