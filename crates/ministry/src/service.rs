//! The Ministry spell service.
//!
//! [`Ministry`] is the composition root: it owns the permission model, the
//! command registry and the audit/metrics sinks, wires them into the fixed
//! aspect pipeline, and exposes a single [`Ministry::cast`] entry point.

use std::sync::Arc;

use ministry_aspects::{AuditAspect, AuthorizationAspect, InvocationContext, Pipeline};
use ministry_core::{CommandRegistry, MinistryResult, PermissionModel, User};
use ministry_spells::catalog::permissions::SPELL_CAST;
use ministry_telemetry::{AuditSink, MetricsSink, NoopMetricsSink};
use serde::{Deserialize, Serialize};

/// Argument key carrying the caller's incantation.
pub const ARG_INCANTATION: &str = "incantation";

/// Audit detail key carrying the request summary.
pub const DETAIL_REQUEST: &str = "request";

/// A request to cast one spell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastRequest {
    /// The authenticated caller.
    pub user: User,
    /// Spell name as typed by the caller.
    pub spell_name: String,
    /// Free-form words spoken with the spell.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incantation: Option<String>,
}

impl CastRequest {
    /// Creates a request without an incantation.
    pub fn new(user: User, spell_name: impl Into<String>) -> Self {
        Self {
            user,
            spell_name: spell_name.into(),
            incantation: None,
        }
    }

    /// Sets the incantation.
    #[must_use]
    pub fn with_incantation(mut self, incantation: impl Into<String>) -> Self {
        self.incantation = Some(incantation.into());
        self
    }

    fn summary(&self) -> String {
        match &self.incantation {
            Some(words) => format!("{} cast '{}' ({words})", self.user.username(), self.spell_name),
            None => format!("{} cast '{}'", self.user.username(), self.spell_name),
        }
    }
}

/// A successful cast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastResponse {
    /// Confirmation returned by the spell.
    pub message: String,
    /// Username of the caster.
    pub user: String,
}

/// The Ministry spell service.
///
/// # Example
///
/// ```
/// use ministry::{CastRequest, Ministry};
/// use ministry_core::User;
/// use ministry_spells::{default_permission_model, default_registry};
///
/// # tokio_test::block_on(async {
/// let ministry = Ministry::builder()
///     .permission_model(default_permission_model())
///     .registry(default_registry().unwrap())
///     .build();
///
/// let response = ministry
///     .cast(CastRequest::new(User::new("harry_potter", "Auror"), "Lumos"))
///     .await
///     .unwrap();
///
/// assert_eq!(response.message, "Wand lit! (Lumos)");
/// # });
/// ```
pub struct Ministry {
    pipeline: Pipeline,
    registry: Arc<CommandRegistry>,
    required_permission: String,
}

impl Ministry {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> MinistryBuilder {
        MinistryBuilder::new()
    }

    /// Casts a spell on behalf of `request.user`.
    ///
    /// The call is authorized, audited and measured before the spell is
    /// resolved from the registry and executed.
    ///
    /// # Errors
    ///
    /// - `PermissionDenied` if the caller's role lacks the required permission
    /// - `CommandNotFound` if no spell is registered under the name
    /// - `ForbiddenOperation` if the spell refuses the caller
    /// - `Logic` for any other spell failure
    pub async fn cast(&self, request: CastRequest) -> MinistryResult<CastResponse> {
        let summary = request.summary();
        let CastRequest {
            user,
            spell_name,
            incantation,
        } = request;

        let mut ctx = InvocationContext::new(user, &self.required_permission, spell_name)
            .with_detail(DETAIL_REQUEST, summary);
        if let Some(words) = incantation {
            ctx = ctx.with_arg(ARG_INCANTATION, words);
        }

        let registry = &self.registry;
        let message = self
            .pipeline
            .process(&mut ctx, move |ctx| {
                let spell = registry.resolve(ctx.operation_name())?;
                spell.execute(ctx.user(), ctx.args())
            })
            .await?;

        Ok(CastResponse {
            message,
            user: ctx.user().username().to_string(),
        })
    }

    /// Returns the aspect pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Returns the command registry.
    #[must_use]
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Returns the permission every cast must hold.
    #[must_use]
    pub fn required_permission(&self) -> &str {
        &self.required_permission
    }
}

impl std::fmt::Debug for Ministry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ministry")
            .field("pipeline", &self.pipeline)
            .field("spells", &self.registry.names())
            .field("required_permission", &self.required_permission)
            .finish()
    }
}

/// Builder for [`Ministry`].
///
/// Every collaborator is injected explicitly. Anything left unset falls back
/// to the safest choice:
///
/// | Unset | Behavior |
/// |-------|----------|
/// | permission model | every cast is denied |
/// | registry | no spells |
/// | audit sink | casts run unaudited, logged at `error` |
/// | metrics sink | metrics are discarded |
#[derive(Default)]
pub struct MinistryBuilder {
    model: Option<Arc<PermissionModel>>,
    registry: Option<CommandRegistry>,
    audit_sink: Option<Arc<dyn AuditSink>>,
    metrics_sink: Option<Arc<dyn MetricsSink>>,
    required_permission: Option<String>,
    record_denials: Option<bool>,
}

impl MinistryBuilder {
    /// Creates a builder with nothing injected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the permission model.
    #[must_use]
    pub fn permission_model(self, model: PermissionModel) -> Self {
        self.shared_permission_model(Arc::new(model))
    }

    /// Sets a shared permission model.
    #[must_use]
    pub fn shared_permission_model(mut self, model: Arc<PermissionModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the command registry.
    #[must_use]
    pub fn registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the audit sink.
    #[must_use]
    pub fn audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    /// Sets the metrics sink.
    #[must_use]
    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics_sink = Some(sink);
        self
    }

    /// Sets the permission every cast must hold. Defaults to `spell:cast`.
    #[must_use]
    pub fn required_permission(mut self, permission: impl Into<String>) -> Self {
        self.required_permission = Some(permission.into());
        self
    }

    /// Whether casts rejected by authorization are audited. Defaults to `true`.
    #[must_use]
    pub fn record_denials(mut self, enabled: bool) -> Self {
        self.record_denials = Some(enabled);
        self
    }

    /// Builds the service.
    #[must_use]
    pub fn build(self) -> Ministry {
        let metrics = self
            .metrics_sink
            .unwrap_or_else(|| Arc::new(NoopMetricsSink) as Arc<dyn MetricsSink>);
        let registry = self.registry.unwrap_or_default();

        let pipeline = Pipeline::builder()
            .authorization(AuthorizationAspect::from_optional(self.model))
            .audit(AuditAspect::from_optional(self.audit_sink, metrics))
            .audit_rejections(self.record_denials.unwrap_or(true))
            .build();

        tracing::info!(
            spells = registry.len(),
            stages = ?pipeline.stage_names(),
            "ministry assembled"
        );

        Ministry {
            pipeline,
            registry: Arc::new(registry),
            required_permission: self
                .required_permission
                .unwrap_or_else(|| SPELL_CAST.to_string()),
        }
    }
}

impl std::fmt::Debug for MinistryBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MinistryBuilder")
            .field("model", &self.model.is_some())
            .field("registry", &self.registry.as_ref().map(CommandRegistry::len))
            .field("audit_sink", &self.audit_sink.is_some())
            .field("metrics_sink", &self.metrics_sink.is_some())
            .field("required_permission", &self.required_permission)
            .finish()
    }
}
