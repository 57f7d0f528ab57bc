//! Aspect stages.
//!
//! This module contains the two aspects applied to every invocation, in
//! pipeline order:
//!
//! 1. [`authorization`] - Permission check against the role model
//! 2. [`audit`] - Audit records and spell metrics around the call

pub mod audit;
pub mod authorization;

// Re-export main types
pub use audit::{AuditAspect, AuditTrail};
pub use authorization::{AuthorizationAspect, AuthorizationResult, PolicyDecision};
