//! Startup composition.
//!
//! [`bootstrap`] turns a validated [`MinistryConfig`] into a ready
//! [`Ministry`]: telemetry first, so every later step can log, then the
//! permission model, the registry and the pipeline.

use std::sync::Arc;

use ministry_config::{ConfigError, MinistryConfig};
use ministry_core::{CommandRegistry, MinistryError};
use ministry_telemetry::{init_telemetry, Telemetry, TelemetryError};
use thiserror::Error;

use crate::Ministry;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Logging, metrics or audit outputs could not be initialized.
    #[error("telemetry initialization failed: {0}")]
    Telemetry(#[from] TelemetryError),

    /// A spell could not be registered.
    #[error("spell registration failed: {0}")]
    Registration(#[from] MinistryError),
}

/// Initializes telemetry and assembles the service described by `config`.
///
/// Logging is installed process-wide, so this should run once per process.
///
/// # Errors
///
/// Returns `BootstrapError` if the configuration is invalid, telemetry fails
/// to initialize, or two spells share a name.
pub fn bootstrap(config: &MinistryConfig) -> Result<Ministry, BootstrapError> {
    config.validate()?;
    let telemetry = init_telemetry(&config.telemetry_config())?;
    Ministry::from_config(config, telemetry)
}

impl Ministry {
    /// Assembles the service from `config` and already initialized sinks.
    ///
    /// The permission model comes from `[authorization.roles]` when present,
    /// otherwise from the built-in Ministry policy. Every known spell is
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError::Registration` if two spells share a name.
    pub fn from_config(config: &MinistryConfig, telemetry: Telemetry) -> Result<Self, BootstrapError> {
        let model = match config.permission_model() {
            Some(model) => {
                tracing::info!(roles = model.len(), "using configured permission model");
                model
            }
            None => ministry_spells::default_permission_model(),
        };

        let mut registry = CommandRegistry::new();
        ministry_spells::register_defaults(&mut registry)?;

        let mut builder = Ministry::builder()
            .shared_permission_model(Arc::new(model))
            .registry(registry)
            .metrics_sink(telemetry.metrics_sink)
            .required_permission(config.authorization.required_permission.clone())
            .record_denials(config.audit.record_denials);

        if let Some(sink) = telemetry.audit_sink {
            builder = builder.audit_sink(sink);
        }

        Ok(builder.build())
    }
}
