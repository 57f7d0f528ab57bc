//! Typed configuration for Ministry.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration system is built around the [`MinistryConfig`] struct:
//!
//! - [`TelemetrySection`] - Service identity, logging and metrics
//! - [`AuthorizationConfig`] - Required permission and an optional role table
//! - [`AuditConfig`] - Audit outputs and denial recording
//!
//! # Example
//!
//! ```no_run
//! use ministry_config::ConfigLoader;
//!
//! # fn main() -> Result<(), ministry_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_optional_file("ministry.toml")?
//!     .with_env_prefix("MINISTRY")
//!     .load()?;
//!
//! println!("Casts require: {}", config.authorization.required_permission);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [telemetry]
//! service_name = "ministry"
//! environment = "production"
//!
//! [telemetry.logging]
//! level = "info,ministry::audit=info"
//! format = "json"
//!
//! [telemetry.metrics]
//! enabled = true
//! latency_buckets = [0.001, 0.01, 0.1, 1.0]
//!
//! [authorization]
//! required_permission = "spell:cast"
//!
//! [authorization.roles]
//! Auror = ["spell:cast", "archive:read"]
//!
//! [audit]
//! enabled = true
//! log_records = true
//! file_path = "/var/log/ministry/audit.jsonl"
//! record_denials = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden via environment variables using the format
//! `PREFIX__SECTION__KEY`. For example:
//!
//! - `MINISTRY__AUDIT__ENABLED=false`
//! - `MINISTRY__TELEMETRY__LOGGING__LEVEL=debug`
//! - `MINISTRY__AUTHORIZATION__REQUIRED_PERMISSION=spell:cast`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{MinistryConfig, MinistryConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    AuditConfig, AuthorizationConfig, LogFormat, LoggingConfig, MetricsConfig, TelemetrySection,
};
