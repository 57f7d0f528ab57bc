//! # Ministry Test
//!
//! Test utilities for Ministry. Everything here is an in-memory stand-in for
//! a collaborator the aspects talk to, so tests can assert on what was
//! recorded instead of scraping logs.
//!
//! ## Key Features
//!
//! - **Recording Sinks**: Capture audit records and metric label arguments
//! - **Spy Constructors**: Count how often the registry builds a command
//! - **Failing Command**: A command that always fails with a logic error
//! - **Fixtures**: The usual cast of users
//!
//! ## Example
//!
//! ```
//! use ministry_test::{fixtures, RecordingAuditSink};
//! use ministry_telemetry::{AuditRecord, AuditSink, AuditStatus};
//! use ministry_core::InvocationId;
//!
//! let sink = RecordingAuditSink::new();
//! let harry = fixtures::harry_potter();
//! sink.append(AuditRecord::new(InvocationId::new(), &harry, "cast_spell", AuditStatus::Attempt));
//!
//! assert_eq!(sink.statuses(), vec![AuditStatus::Attempt]);
//! ```

#![doc(html_root_url = "https://docs.rs/ministry-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
pub mod sinks;
pub mod spy;

pub use sinks::{MetricCall, MetricKind, RecordingAuditSink, RecordingMetricsSink};
pub use spy::{failing_constructor, ConstructionCounter, FailingCommand};
