//! Telemetry error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while bringing up logging, metrics or audit outputs.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The Prometheus recorder could not be installed.
    #[error("metrics initialization failed: {0}")]
    MetricsInit(String),

    /// The tracing subscriber could not be installed.
    #[error("logging initialization failed: {0}")]
    LoggingInit(String),

    /// The audit file could not be opened for appending.
    #[error("cannot open audit file {}: {source}", path.display())]
    AuditSink {
        /// File that was being opened.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::MetricsInit("recorder already installed".to_string());
        assert_eq!(
            err.to_string(),
            "metrics initialization failed: recorder already installed"
        );
    }

    #[test]
    fn test_audit_sink_error_keeps_source() {
        let err = TelemetryError::AuditSink {
            path: PathBuf::from("/var/log/ministry/audit.jsonl"),
            source: std::io::Error::other("disk full"),
        };
        assert!(err.to_string().contains("/var/log/ministry/audit.jsonl"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
