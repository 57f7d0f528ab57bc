//! # Ministry
//!
//! **Authorized, audited spell casting for the Ministry of Magic**
//!
//! Every cast goes through the same fixed pipeline:
//!
//! ```text
//! CastRequest → Authorization → Audit ─→ resolve spell → execute
//!                   │             │                         │
//!                   │             └── ATTEMPT      SUCCESS / FAILURE + metrics
//!                   └── PermissionDenied (spell never built)
//! ```
//!
//! - **Authorization** checks the caller's role against the permission
//!   model and fails closed when no model is configured.
//! - **Audit** writes an ATTEMPT record, then exactly one SUCCESS or FAILURE
//!   record, and updates the spell latency histogram and counters.
//! - Spells are resolved by case-insensitive name from a registry filled at
//!   startup.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ministry::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_optional_file("ministry.toml")?
//!         .with_env_prefix("MINISTRY")
//!         .load()?;
//!
//!     let ministry = ministry::bootstrap(&config)?;
//!
//!     let response = ministry
//!         .cast(CastRequest::new(User::new("harry_potter", "Auror"), "Lumos"))
//!         .await?;
//!     println!("{}", response.message);
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ministry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bootstrap;
mod service;

pub use bootstrap::{bootstrap, BootstrapError};
pub use service::{CastRequest, CastResponse, Ministry, MinistryBuilder, ARG_INCANTATION, DETAIL_REQUEST};

// Re-export core types
pub use ministry_core as core;

// Re-export the aspect pipeline
pub use ministry_aspects as aspects;

// Re-export audit and metrics
pub use ministry_telemetry as telemetry;

// Re-export configuration
pub use ministry_config as config;

// Re-export the spell catalog
pub use ministry_spells as spells;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use ministry::prelude::*;
///
/// let user = User::new("hermione_granger", "Ministro");
/// assert_eq!(user.role(), "Ministro");
/// ```
pub mod prelude {
    pub use crate::{bootstrap, BootstrapError, CastRequest, CastResponse, Ministry};

    pub use ministry_core::{
        Command, CommandArgs, CommandRegistry, ErrorCategory, InvocationId, MinistryError,
        MinistryResult, PermissionModel, User,
    };

    pub use ministry_aspects::{AuditAspect, AuthorizationAspect, InvocationContext, Pipeline};

    pub use ministry_telemetry::{
        AuditPriority, AuditRecord, AuditSink, AuditStatus, MetricsSink, Outcome,
    };

    pub use ministry_config::{ConfigError, ConfigLoader, MinistryConfig};

    pub use ministry_spells::{default_permission_model, default_registry};
}
