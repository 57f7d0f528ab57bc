//! # Ministry Core
//!
//! Core types and traits for the Ministry aspect pipeline.
//!
//! This crate provides the foundational types used throughout Ministry:
//!
//! - [`User`] - The caller of an operation (username + opaque role)
//! - [`InvocationId`] - UUID v7 invocation identifier shared by audit records
//! - [`PermissionModel`] - Role-based permission lookup that fails closed
//! - [`Command`] - Core business-logic trait
//! - [`CommandRegistry`] - Case-insensitive name-to-constructor registry
//! - [`MinistryError`] - Tagged failure taxonomy

#![doc(html_root_url = "https://docs.rs/ministry-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod command;
mod context;
mod error;
mod permissions;
pub mod registry;
mod user;

pub use command::{Command, CommandArgs};
pub use context::InvocationId;
pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, MinistryError, MinistryResult};
pub use permissions::{PermissionModel, PermissionModelBuilder};
pub use registry::{CommandConstructor, CommandRegistry};
pub use user::User;
