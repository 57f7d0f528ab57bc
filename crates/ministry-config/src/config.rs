//! Main configuration types.
//!
//! This module provides the top-level [`MinistryConfig`] struct and its builder.

use ministry_core::PermissionModel;
use ministry_telemetry::{LogOutput, TelemetryConfig};
use serde::{Deserialize, Serialize};

use crate::{AuditConfig, AuthorizationConfig, ConfigError, LogFormat, TelemetrySection};

/// Complete Ministry configuration.
///
/// This is the root configuration type that contains all configuration sections.
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use ministry_config::MinistryConfig;
///
/// let config = MinistryConfig::default();
/// assert_eq!(config.authorization.required_permission, "spell:cast");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct MinistryConfig {
    /// Telemetry configuration (logging, metrics).
    #[serde(default)]
    pub telemetry: TelemetrySection,

    /// Authorization configuration.
    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// Audit configuration.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl MinistryConfig {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```
    /// use ministry_config::{AuditConfig, MinistryConfig};
    ///
    /// let config = MinistryConfig::builder()
    ///     .audit(AuditConfig {
    ///         record_denials: false,
    ///         ..Default::default()
    ///     })
    ///     .build();
    ///
    /// assert!(!config.audit.record_denials);
    /// ```
    #[must_use]
    pub fn builder() -> MinistryConfigBuilder {
        MinistryConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The log filter does not parse
    /// - Latency buckets are empty, unsorted or not positive while metrics are enabled
    /// - The required permission is empty
    /// - A configured role name is empty
    /// - The audit file path is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let logging = &self.telemetry.logging;
        if logging.enabled {
            if let Err(e) = ministry_telemetry::logging::create_env_filter(&logging.level) {
                return Err(ConfigError::invalid_value(
                    "telemetry.logging.level",
                    e.to_string(),
                ));
            }
        }

        let metrics = &self.telemetry.metrics;
        if metrics.enabled {
            if metrics.latency_buckets.is_empty() {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.latency_buckets",
                    "must not be empty",
                ));
            }
            if metrics.latency_buckets.iter().any(|b| !b.is_finite() || *b <= 0.0) {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.latency_buckets",
                    "bucket boundaries must be positive",
                ));
            }
            if metrics.latency_buckets.windows(2).any(|w| w[0] >= w[1]) {
                return Err(ConfigError::invalid_value(
                    "telemetry.metrics.latency_buckets",
                    "bucket boundaries must be strictly increasing",
                ));
            }
        }

        if self.authorization.required_permission.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "authorization.required_permission",
                "must not be empty",
            ));
        }

        if let Some(roles) = &self.authorization.roles {
            if roles.keys().any(|role| role.trim().is_empty()) {
                return Err(ConfigError::invalid_value(
                    "authorization.roles",
                    "role names must not be empty",
                ));
            }
        }

        if let Some(path) = &self.audit.file_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::invalid_value(
                    "audit.file_path",
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logs with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use ministry_config::MinistryConfig;
    ///
    /// let config = MinistryConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.telemetry.logging.include_location = true;
        config.telemetry.environment = "development".to_string();

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON info logs; audit records go to the tracing target.
    ///
    /// # Example
    ///
    /// ```
    /// use ministry_config::MinistryConfig;
    ///
    /// let config = MinistryConfig::production();
    /// assert_eq!(config.telemetry.logging.format, ministry_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.environment = "production".to_string();
        config.audit.enabled = true;
        config.audit.log_records = true;

        config
    }

    /// Converts the telemetry and audit sections into a [`TelemetryConfig`].
    #[must_use]
    pub fn telemetry_config(&self) -> TelemetryConfig {
        let section = &self.telemetry;

        let logging = ministry_telemetry::LogConfig {
            enabled: section.logging.enabled,
            filter: section.logging.level.clone(),
            output: match section.logging.format {
                LogFormat::Json => LogOutput::Json,
                LogFormat::Pretty => LogOutput::Pretty,
            },
            location: section.logging.include_location,
            ..Default::default()
        };

        let metrics = ministry_telemetry::MetricsConfig {
            enabled: section.metrics.enabled,
            latency_buckets: section.metrics.latency_buckets.clone(),
        };

        let audit = ministry_telemetry::AuditConfig {
            enabled: self.audit.enabled,
            log_records: self.audit.log_records,
            file_path: self.audit.file_path.clone(),
        };

        TelemetryConfig::new(&section.service_name, &section.environment)
            .with_logging(logging)
            .with_metrics(metrics)
            .with_audit(audit)
    }

    /// Builds the permission model from `[authorization.roles]`.
    ///
    /// Returns `None` when no roles table is configured.
    #[must_use]
    pub fn permission_model(&self) -> Option<PermissionModel> {
        self.authorization
            .roles
            .as_ref()
            .map(|roles| PermissionModel::from_roles(roles.clone()))
    }
}

/// Builder for [`MinistryConfig`].
#[derive(Debug, Default)]
pub struct MinistryConfigBuilder {
    telemetry: Option<TelemetrySection>,
    authorization: Option<AuthorizationConfig>,
    audit: Option<AuditConfig>,
}

impl MinistryConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the telemetry configuration.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetrySection) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Set the authorization configuration.
    #[must_use]
    pub fn authorization(mut self, authorization: AuthorizationConfig) -> Self {
        self.authorization = Some(authorization);
        self
    }

    /// Set the audit configuration.
    #[must_use]
    pub fn audit(mut self, audit: AuditConfig) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> MinistryConfig {
        MinistryConfig {
            telemetry: self.telemetry.unwrap_or_default(),
            authorization: self.authorization.unwrap_or_default(),
            audit: self.audit.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<MinistryConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
