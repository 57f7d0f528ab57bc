//! Structured logging for Ministry.
//!
//! A single `fmt` layer is installed on a `tracing-subscriber` registry.
//! Production emits one JSON object per event; development uses the pretty
//! multi-line renderer with span open/close events.
//!
//! Audit records are logged on their own target (see
//! [`AUDIT_TARGET`](crate::audit::AUDIT_TARGET)), so a filter such as
//! `info,ministry::audit=warn` tunes them independently of spell logs.
//!
//! ```rust,ignore
//! use ministry_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(spell = "Lumos", username = "harry_potter", "casting");
//! ```

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// How log events are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable, multi-line output with span lifecycle events.
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// When false, [`init_logging`] installs nothing.
    pub enabled: bool,

    /// `EnvFilter` directive, e.g. `info` or `info,ministry::audit=warn`.
    pub filter: String,

    /// Output renderer.
    pub output: LogOutput,

    /// Attach source file and line to each event.
    pub location: bool,

    /// Reported once when logging comes up.
    pub service_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// JSON output at `info`, without source locations.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            filter: "info".to_string(),
            output: LogOutput::Json,
            location: false,
            service_name: "ministry".to_string(),
        }
    }

    /// Pretty output at `debug`, with source locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            filter: "debug".to_string(),
            output: LogOutput::Pretty,
            location: true,
            ..Self::production()
        }
    }

    fn layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = tracing_subscriber::fmt::layer()
            .with_file(self.location)
            .with_line_number(self.location);

        match self.output {
            LogOutput::Json => base.json().flatten_event(true).boxed(),
            LogOutput::Pretty => base
                .pretty()
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .boxed(),
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` when the filter does not parse or
/// another global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.filter)?;

    tracing_subscriber::registry()
        .with(config.layer().with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.service_name,
        output = ?config.output,
        "logging initialized"
    );
    Ok(())
}

/// Parses an `EnvFilter` directive.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` naming the bad directive.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive)
        .map_err(|e| TelemetryError::LoggingInit(format!("invalid filter '{directive}': {e}")))
}
