//! Section types mirroring the `ministry.toml` layout.
//!
//! Every struct rejects unknown keys, and every key is optional.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Telemetry configuration section.
///
/// Service identity plus the logging and metrics subsections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Service name attached to log lines.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Deployment environment (e.g., "production", "staging").
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for TelemetrySection {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            environment: default_environment(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

fn default_service_name() -> String {
    "ministry".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable multi-line output.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log filter (e.g., "info", "debug", "info,ministry::audit=warn").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line number in log lines.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Enable metrics collection.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Histogram bucket boundaries for spell latency, in seconds.
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            latency_buckets: default_latency_buckets(),
        }
    }
}

fn default_latency_buckets() -> Vec<f64> {
    ministry_telemetry::metrics::default_latency_buckets()
}

/// Authorization configuration section.
///
/// # Example
///
/// ```
/// use ministry_config::AuthorizationConfig;
///
/// let config: AuthorizationConfig = toml::from_str(r#"
///     required_permission = "spell:cast"
///
///     [roles]
///     Auror = ["spell:cast"]
/// "#).unwrap();
///
/// assert!(config.roles.unwrap()["Auror"].contains("spell:cast"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthorizationConfig {
    /// Permission every cast must hold.
    #[serde(default = "default_required_permission")]
    pub required_permission: String,

    /// Role to permissions table. Replaces the built-in Ministry policy
    /// when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeMap<String, BTreeSet<String>>>,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            required_permission: default_required_permission(),
            roles: None,
        }
    }
}

fn default_required_permission() -> String {
    "spell:cast".to_string()
}

/// Audit configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Produce audit records. When off, casts run without an audit sink.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Write records to the `ministry::audit` tracing target.
    #[serde(default = "default_true")]
    pub log_records: bool,

    /// Append records as JSON lines to this file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Audit casts rejected before reaching the audit stage.
    #[serde(default = "default_true")]
    pub record_denials: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_records: true,
            file_path: None,
            record_denials: true,
        }
    }
}

fn default_true() -> bool {
    true
}
