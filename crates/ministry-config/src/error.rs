//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded or accepted.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required configuration file does not exist.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read {path}")]
    Read {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML, a wrong type, or an unknown key.
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, a wrong type, or an unknown key.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Only `toml` and `json` are understood.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// A value parsed but is not acceptable.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted key, e.g. `telemetry.metrics.latency_buckets`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `MINISTRY__...` override could not be parsed.
    #[error("environment variable {var}: {reason}")]
    EnvVar {
        /// Full variable name.
        var: String,
        /// What is wrong with its value.
        reason: String,
    },

    /// A dotenv file exists but is malformed or unreadable.
    #[error("cannot load dotenv file: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl ConfigError {
    pub(crate) fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Rejects the value at `field`.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn env_var(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvVar {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = ConfigError::file_not_found("/etc/ministry/ministry.toml");
        assert!(err.to_string().contains("/etc/ministry/ministry.toml"));

        let err = ConfigError::invalid_value("audit.file_path", "must not be empty");
        assert_eq!(err.to_string(), "audit.file_path: must not be empty");

        let err = ConfigError::env_var("MINISTRY__AUDIT__ENABLED", "expected boolean");
        assert!(err.to_string().contains("MINISTRY__AUDIT__ENABLED"));

        let err = ConfigError::unsupported_format("yaml");
        assert!(err.to_string().ends_with("yaml"));
    }

    #[test]
    fn test_read_error_keeps_source() {
        let err = ConfigError::read("ministry.toml", std::io::Error::other("permission denied"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_toml_error_conversion() {
        let parse: Result<crate::MinistryConfig, _> = toml::from_str("[audit]\nenabled = 3");
        let err: ConfigError = parse.unwrap_err().into();
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
