//! # Ministry Aspects
//!
//! Aspect pipeline for Ministry operations.
//!
//! Authorization and audit are applied around a business call as explicit
//! aspects, so the call itself knows nothing about either. The order is
//! fixed and cannot be changed by callers.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Invocation → Authorization → Audit → resolve + execute
//!                                 ↓
//! Result     ←──────────────── Audit (SUCCESS / FAILURE)
//! ```
//!
//! | Stage | Aspect        | Advice | Purpose                                      |
//! |-------|---------------|--------|----------------------------------------------|
//! | 1     | Authorization | before | Refuse callers whose role lacks the permission |
//! | 2     | Audit         | around | ATTEMPT / SUCCESS / FAILURE records, metrics |
//!
//! ## Key Features
//!
//! - **Fixed Order**: Stages run in [`Stage`] order whatever the builder order
//! - **Fail Closed**: A missing permission model denies every call
//! - **Observational Audit**: Failures are recorded and returned unchanged
//! - **Explicit Dependencies**: Models and sinks are passed in at construction
//!
//! ## Example
//!
//! ```
//! use ministry_aspects::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 2);
//! assert_eq!(stages[0].name(), "authorization");
//! assert_eq!(stages[1].name(), "audit");
//! ```

#![doc(html_root_url = "https://docs.rs/ministry-aspects/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod aspect;
pub mod context;
pub mod pipeline;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use aspect::{Aspect, BoxFuture, Next};
pub use context::InvocationContext;
pub use pipeline::{Pipeline, PipelineBuilder, Stage};
pub use stages::audit::{AuditAspect, AuditTrail};
pub use stages::authorization::{enforce, AuthorizationAspect, AuthorizationResult};
pub use types::AspectResult;
