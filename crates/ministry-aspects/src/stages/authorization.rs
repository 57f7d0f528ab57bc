//! Authorization aspect (before-advice).
//!
//! This aspect checks the caller's role against the [`PermissionModel`]
//! before anything else runs. When the check fails the chain is cut: the
//! command is never resolved, let alone executed.
//!
//! # Pipeline Position
//!
//! ```text
//! Invocation → [Authorization] → Audit → resolve + execute
//! ```
//!
//! # Fail Closed
//!
//! An aspect built without a permission model denies every call. A missing
//! security dependency is a configuration error and must never grant access.
//!
//! # Example
//!
//! ```rust
//! use ministry_aspects::stages::authorization::{enforce, AuthorizationAspect};
//! use ministry_core::{PermissionModel, User};
//! use std::sync::Arc;
//!
//! let model = PermissionModel::builder().grant("Auror", ["spell:cast"]).build();
//! let harry = User::new("harry_potter", "Auror");
//! let percy = User::new("percy_weasley", "Funcionario");
//!
//! assert!(enforce(&harry, "spell:cast", Some(&model)).is_ok());
//! assert!(enforce(&percy, "spell:cast", Some(&model)).is_err());
//! assert!(enforce(&harry, "spell:cast", None).is_err());
//!
//! let aspect = AuthorizationAspect::new(Arc::new(model));
//! assert!(aspect.check(&harry, "spell:cast").is_ok());
//! ```

use crate::{
    aspect::{Aspect, BoxFuture, Next},
    context::InvocationContext,
    types::AspectResult,
};
use ministry_core::{MinistryError, MinistryResult, PermissionModel, User};
use std::sync::Arc;

/// Reason recorded when no permission model is available.
pub const MODEL_UNAVAILABLE: &str = "permission model unavailable";

/// Authorization aspect that enforces the permission model.
#[derive(Debug, Clone)]
pub struct AuthorizationAspect {
    model: Option<Arc<PermissionModel>>,
}

/// Result of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The call may proceed.
    Allow,
    /// The call is blocked.
    Deny {
        /// The reason for denial.
        reason: String,
    },
}

impl PolicyDecision {
    /// Returns `true` for [`PolicyDecision::Allow`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Authorization result stored in context for auditing.
#[derive(Debug, Clone)]
pub struct AuthorizationResult {
    /// Whether the call was allowed.
    pub allowed: bool,
    /// The permission that was checked.
    pub permission: String,
    /// Denial reason if not allowed.
    pub reason: Option<String>,
}

impl AuthorizationAspect {
    /// Creates an aspect backed by `model`.
    #[must_use]
    pub fn new(model: Arc<PermissionModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Creates an aspect with no model. It denies every call.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self { model: None }
    }

    /// Creates an aspect from an optional model.
    #[must_use]
    pub fn from_optional(model: Option<Arc<PermissionModel>>) -> Self {
        Self { model }
    }

    /// Returns the permission model, if configured.
    #[must_use]
    pub fn model(&self) -> Option<&PermissionModel> {
        self.model.as_deref()
    }

    /// Checks `user` against `required_permission`.
    ///
    /// # Errors
    ///
    /// Returns [`MinistryError::PermissionDenied`] when the role lacks the
    /// permission or no model is configured.
    pub fn check(&self, user: &User, required_permission: &str) -> MinistryResult<()> {
        enforce(user, required_permission, self.model())
    }
}

/// Decides whether `user` may use `required_permission`.
///
/// Logs the decision: `debug` when granted, `warn` when denied and `error`
/// when no model is available.
pub fn evaluate(
    user: &User,
    required_permission: &str,
    model: Option<&PermissionModel>,
) -> PolicyDecision {
    let Some(model) = model else {
        tracing::error!(
            username = user.username(),
            permission = required_permission,
            "{MODEL_UNAVAILABLE}, denying by default"
        );
        return PolicyDecision::Deny {
            reason: MODEL_UNAVAILABLE.to_string(),
        };
    };

    tracing::debug!(
        username = user.username(),
        role = user.role(),
        permission = required_permission,
        "checking permission"
    );

    if model.has_permission(user.role(), required_permission) {
        tracing::debug!(username = user.username(), "access granted");
        PolicyDecision::Allow
    } else {
        tracing::warn!(
            username = user.username(),
            role = user.role(),
            permission = required_permission,
            "access denied"
        );
        PolicyDecision::Deny {
            reason: format!(
                "role '{}' does not hold '{required_permission}'",
                user.role()
            ),
        }
    }
}

/// Enforces `required_permission` for `user`.
///
/// # Errors
///
/// Returns [`MinistryError::PermissionDenied`] carrying the username and the
/// required permission whenever [`evaluate`] denies.
pub fn enforce(
    user: &User,
    required_permission: &str,
    model: Option<&PermissionModel>,
) -> MinistryResult<()> {
    match evaluate(user, required_permission, model) {
        PolicyDecision::Allow => Ok(()),
        PolicyDecision::Deny { .. } => Err(MinistryError::permission_denied(
            user.username(),
            required_permission,
        )),
    }
}

impl Aspect for AuthorizationAspect {
    fn name(&self) -> &'static str {
        "authorization"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut InvocationContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, AspectResult> {
        Box::pin(async move {
            let decision = evaluate(ctx.user(), ctx.required_permission(), self.model());

            match decision {
                PolicyDecision::Allow => {
                    ctx.set_extension(AuthorizationResult {
                        allowed: true,
                        permission: ctx.required_permission().to_string(),
                        reason: None,
                    });

                    next.run(ctx).await
                }
                PolicyDecision::Deny { reason } => {
                    ctx.set_extension(AuthorizationResult {
                        allowed: false,
                        permission: ctx.required_permission().to_string(),
                        reason: Some(reason),
                    });

                    Err(MinistryError::permission_denied(
                        ctx.user().username(),
                        ctx.required_permission(),
                    ))
                }
            }
        })
    }
}
