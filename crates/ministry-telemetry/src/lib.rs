//! Observability for Ministry: logging, metrics and the audit trail.
//!
//! - **Logging**: structured JSON or pretty output via `tracing-subscriber`
//! - **Metrics**: Prometheus-format spell metrics via the `metrics` crate
//! - **Audit**: append-only [`AuditRecord`]s delivered to an [`AuditSink`]
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      ministry-aspects                       │
//! │          AuditAspect ──────────────┬──────────────┐         │
//! └────────────────────────────────────┼──────────────┼─────────┘
//!                                      │              │
//!                               dyn AuditSink   dyn MetricsSink
//!                                      │              │
//!              ┌───────────────────────┼──────┐       │
//!              ▼                       ▼      ▼       ▼
//!        ┌──────────┐          ┌──────────┐ ┌────────────┐
//!        │ tracing  │          │ JSON     │ │ Prometheus │
//!        │ (audit)  │          │ lines    │ │  recorder  │
//!        └──────────┘          └──────────┘ └────────────┘
//! ```
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `magic_spell_casts_total` | Counter | `spell_name`, `status` |
//! | `magic_spell_cast_latency_seconds` | Histogram | `spell_name`, `status` |
//! | `magic_events_total` | Counter | `event_type` |
//!
//! # Example
//!
//! ```rust,ignore
//! use ministry_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::new("ministry", "production");
//! let telemetry = init_telemetry(&config)?;
//! if let Some(registry) = &telemetry.registry {
//!     println!("{}", registry.render());
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ministry-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

use std::sync::Arc;

pub use audit::{
    build_audit_sink, AuditConfig, AuditDetails, AuditPriority, AuditRecord, AuditSink,
    AuditStatus, FanoutAuditSink, FileAuditSink, TracingAuditSink,
};
pub use config::TelemetryConfig;
pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogOutput};
pub use crate::metrics::{
    init_metrics, record_cast, MetricsConfig, MetricsRegistry, MetricsSink, NoopMetricsSink,
    Outcome, PrometheusMetricsSink,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Sinks produced by [`init_telemetry`].
#[derive(Clone)]
pub struct Telemetry {
    /// Audit sink, `None` when audit is disabled.
    pub audit_sink: Option<Arc<dyn AuditSink>>,
    /// Metrics sink; a no-op sink when metrics are disabled.
    pub metrics_sink: Arc<dyn MetricsSink>,
    /// Prometheus registry for rendering, when metrics are enabled.
    pub registry: Option<MetricsRegistry>,
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("audit", &self.audit_sink.is_some())
            .field("metrics", &self.registry.is_some())
            .finish()
    }
}

/// Initializes all telemetry subsystems.
///
/// Logging is installed first so that the remaining steps can log.
///
/// # Errors
///
/// Returns `TelemetryError` if any subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Telemetry> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;

    let metrics_sink: Arc<dyn MetricsSink> = if config.metrics.enabled {
        Arc::new(PrometheusMetricsSink)
    } else {
        Arc::new(NoopMetricsSink)
    };

    let audit_sink = build_audit_sink(&config.audit)?;

    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        metrics = config.metrics.enabled,
        audit = audit_sink.is_some(),
        "telemetry initialized"
    );

    Ok(Telemetry {
        audit_sink,
        metrics_sink,
        registry: if config.metrics.enabled {
            MetricsRegistry::global()
        } else {
            None
        },
    })
}
