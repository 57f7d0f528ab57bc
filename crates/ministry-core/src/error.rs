//! Error types for the Ministry aspect core.
//!
//! This module provides the [`MinistryError`] type, the tagged failure that
//! travels back up through every aspect of the pipeline. Failures are
//! classified by [`ErrorCategory`], never by message text, so metric labels
//! and transport status codes stay stable when wording changes.
//!
//! | Variant | `ErrorCategory` | Status | Security |
//! |---|---|---|---|
//! | `PermissionDenied` | `PermissionDenied` | 403 | yes |
//! | `CommandNotFound` | `NotFound` | 404 | no |
//! | `ForbiddenOperation` | `ForbiddenOperation` | 400 | yes |
//! | `DuplicateRegistration` | `Configuration` | 500 | no |
//! | `Logic` | `Logic` | 500 | no |

use crate::InvocationId;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`MinistryError`].
pub type MinistryResult<T> = Result<T, MinistryError>;

/// Categories of failures for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The caller's role lacks the required permission.
    PermissionDenied,
    /// The requested operation is not registered.
    NotFound,
    /// A business rule rejected the caller (command-internal check).
    ForbiddenOperation,
    /// Startup composition was invalid.
    Configuration,
    /// Any other failure raised by a command.
    Logic,
}

impl ErrorCategory {
    /// Returns the status code a transport should answer with.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::ForbiddenOperation => StatusCode::BAD_REQUEST,
            Self::Configuration | Self::Logic => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for security failures.
    ///
    /// Security failures are metered as `fail_security` and counted as
    /// `security_fail` events; everything else is a logic failure.
    #[must_use]
    pub const fn is_security(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::ForbiddenOperation)
    }

    /// Returns the snake_case name used in envelopes and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::NotFound => "not_found",
            Self::ForbiddenOperation => "forbidden_operation",
            Self::Configuration => "configuration",
            Self::Logic => "logic",
        }
    }
}

/// Standard failure type for the aspect core.
///
/// # Example
///
/// ```
/// use ministry_core::{ErrorCategory, MinistryError};
///
/// let error = MinistryError::permission_denied("percy_weasley", "spell:cast");
/// assert_eq!(error.category(), ErrorCategory::PermissionDenied);
/// assert!(error.is_security());
/// ```
#[derive(Error, Debug)]
pub enum MinistryError {
    /// The caller's role does not hold the required permission.
    #[error("user '{username}' lacks the required permission '{required_permission}'")]
    PermissionDenied {
        /// The rejected caller.
        username: String,
        /// The permission the operation requires.
        required_permission: String,
    },

    /// No command is registered under the requested name.
    #[error("spell '{requested_name}' not found")]
    CommandNotFound {
        /// The name as the caller supplied it.
        requested_name: String,
    },

    /// A command refused to run for this caller.
    #[error("illegal use of unforgivable spell '{operation_name}' detected by {username}")]
    ForbiddenOperation {
        /// The operation that was refused.
        operation_name: String,
        /// The rejected caller.
        username: String,
    },

    /// A command name was registered twice.
    #[error("spell '{name}' is already registered")]
    DuplicateRegistration {
        /// The normalized name that collided.
        name: String,
    },

    /// Unclassified failure from a command.
    #[error("spell failed: {message}")]
    Logic {
        /// Human-readable error message.
        message: String,
        /// The underlying error, if any.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl MinistryError {
    /// Creates a permission denial.
    #[must_use]
    pub fn permission_denied(
        username: impl Into<String>,
        required_permission: impl Into<String>,
    ) -> Self {
        Self::PermissionDenied {
            username: username.into(),
            required_permission: required_permission.into(),
        }
    }

    /// Creates a not-found error for an unknown command name.
    #[must_use]
    pub fn command_not_found(requested_name: impl Into<String>) -> Self {
        Self::CommandNotFound {
            requested_name: requested_name.into(),
        }
    }

    /// Creates a forbidden-operation error.
    #[must_use]
    pub fn forbidden_operation(
        operation_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self::ForbiddenOperation {
            operation_name: operation_name.into(),
            username: username.into(),
        }
    }

    /// Creates a duplicate-registration error.
    #[must_use]
    pub fn duplicate_registration(name: impl Into<String>) -> Self {
        Self::DuplicateRegistration { name: name.into() }
    }

    /// Creates a logic failure.
    #[must_use]
    pub fn logic(message: impl Into<String>) -> Self {
        Self::Logic {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a logic failure wrapping an underlying error.
    pub fn logic_with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Logic {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::PermissionDenied { .. } => ErrorCategory::PermissionDenied,
            Self::CommandNotFound { .. } => ErrorCategory::NotFound,
            Self::ForbiddenOperation { .. } => ErrorCategory::ForbiddenOperation,
            Self::DuplicateRegistration { .. } => ErrorCategory::Configuration,
            Self::Logic { .. } => ErrorCategory::Logic,
        }
    }

    /// Returns `true` if this is a security failure.
    #[must_use]
    pub const fn is_security(&self) -> bool {
        self.category().is_security()
    }

    /// Returns the status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, invocation_id: Option<InvocationId>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code(),
                message: self.to_string(),
                category: self.category(),
                details: self.error_details(),
            },
            invocation_id: invocation_id.map(|id| id.to_string()),
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    fn error_code(&self) -> String {
        match self {
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::CommandNotFound { .. } => "SPELL_NOT_FOUND",
            Self::ForbiddenOperation { .. } => "FORBIDDEN_OPERATION",
            Self::DuplicateRegistration { .. } => "DUPLICATE_REGISTRATION",
            Self::Logic { .. } => "SPELL_FAILED",
        }
        .to_string()
    }

    /// Returns the identifiers a transport needs without parsing the message.
    #[must_use]
    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            Self::PermissionDenied {
                username,
                required_permission,
            } => Some(serde_json::json!({
                "username": username,
                "required_permission": required_permission
            })),
            Self::CommandNotFound { requested_name } => Some(serde_json::json!({
                "requested_name": requested_name
            })),
            Self::ForbiddenOperation {
                operation_name,
                username,
            } => Some(serde_json::json!({
                "operation_name": operation_name,
                "username": username
            })),
            Self::DuplicateRegistration { name } => Some(serde_json::json!({
                "name": name
            })),
            Self::Logic { .. } => None,
        }
    }
}

/// Serializable error envelope for transports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The invocation ID for correlation with the audit trail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
