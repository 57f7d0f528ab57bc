//! Telemetry configuration.

use crate::audit::AuditConfig;
use crate::logging::LogConfig;
use crate::metrics::MetricsConfig;

/// Everything [`init_telemetry`](crate::init_telemetry) needs.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name, copied into the logging settings.
    pub service_name: String,

    /// Deployment environment, e.g. `production`.
    pub environment: String,

    /// Logging subscriber settings.
    pub logging: LogConfig,

    /// Prometheus recorder settings.
    pub metrics: MetricsConfig,

    /// Audit record outputs.
    pub audit: AuditConfig,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::new("ministry", "development")
    }
}

impl TelemetryConfig {
    /// Creates a configuration with default subsystems.
    #[must_use]
    pub fn new(service_name: impl Into<String>, environment: impl Into<String>) -> Self {
        let service_name = service_name.into();
        Self {
            logging: LogConfig {
                service_name: service_name.clone(),
                ..LogConfig::default()
            },
            service_name,
            environment: environment.into(),
            metrics: MetricsConfig::default(),
            audit: AuditConfig::default(),
        }
    }

    /// Nothing installed process-wide and no audit output.
    #[must_use]
    pub fn disabled() -> Self {
        let mut config = Self::default();
        config.logging.enabled = false;
        config.metrics.enabled = false;
        config.audit.enabled = false;
        config
    }

    /// Replaces the logging settings, keeping this config's service name.
    #[must_use]
    pub fn with_logging(mut self, logging: LogConfig) -> Self {
        self.logging = LogConfig {
            service_name: self.service_name.clone(),
            ..logging
        };
        self
    }

    /// Replaces the metrics settings.
    #[must_use]
    pub fn with_metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replaces the audit settings.
    #[must_use]
    pub fn with_audit(mut self, audit: AuditConfig) -> Self {
        self.audit = audit;
        self
    }
}
