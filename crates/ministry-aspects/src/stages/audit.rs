//! Audit aspect (around-advice).
//!
//! This aspect wraps the authorized call and records what happened to it:
//! an ATTEMPT record before the call, a SUCCESS or FAILURE record after it,
//! and one latency sample plus two counters labeled by the classified
//! [`Outcome`]. Failures are observed and handed back unchanged.
//!
//! # Pipeline Position
//!
//! ```text
//! Invocation → Authorization → [Audit] → resolve + execute
//! ```
//!
//! # Metrics Emitted
//!
//! - `magic_spell_cast_latency_seconds{spell_name, status}`
//! - `magic_spell_casts_total{spell_name, status}`
//! - `magic_events_total{event_type}`
//!
//! # Degraded Mode
//!
//! Without an audit sink the aspect logs the degradation at `error` and still
//! runs the call. No records and no metrics are produced for it.
//!
//! # Example
//!
//! ```rust
//! use ministry_aspects::stages::audit::AuditAspect;
//! use ministry_core::{MinistryError, User};
//! use ministry_telemetry::{AuditDetails, NoopMetricsSink, TracingAuditSink};
//! use std::sync::Arc;
//!
//! let audit = AuditAspect::new(Arc::new(TracingAuditSink), Arc::new(NoopMetricsSink));
//! let user = User::new("harry_potter", "Auror");
//!
//! let result = audit.wrap(&user, "cast_spell", "Lumos", AuditDetails::new(), || {
//!     Ok::<_, MinistryError>("Wand lit!")
//! });
//! assert_eq!(result.unwrap(), "Wand lit!");
//! ```

use crate::{
    aspect::{Aspect, BoxFuture, Next},
    context::InvocationContext,
    stages::authorization::AuthorizationResult,
    types::AspectResult,
};
use ministry_core::{InvocationId, MinistryError, MinistryResult, User};
use ministry_telemetry::{
    record_cast, AuditDetails, AuditPriority, AuditRecord, AuditSink, AuditStatus, MetricsSink,
    Outcome,
};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Detail key carrying the requested operation name.
pub const DETAIL_SPELL: &str = "spell";

/// Detail key carrying the failure text.
pub const DETAIL_ERROR: &str = "error";

/// Detail key naming the stage that rejected a call.
pub const DETAIL_STAGE: &str = "stage";

/// Audit aspect that records every call passing through it.
#[derive(Clone)]
pub struct AuditAspect {
    sink: Option<Arc<dyn AuditSink>>,
    metrics: Arc<dyn MetricsSink>,
}

/// What the audit aspect observed, stored in context after the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuditTrail {
    /// Classified outcome, `None` when degraded.
    pub outcome: Option<Outcome>,
    /// Measured latency, `None` when degraded.
    pub latency: Option<Duration>,
    /// Whether the call ran without an audit sink.
    pub degraded: bool,
}

impl AuditTrail {
    fn recorded(outcome: Outcome, latency: Duration) -> Self {
        Self {
            outcome: Some(outcome),
            latency: Some(latency),
            degraded: false,
        }
    }

    fn degraded() -> Self {
        Self {
            outcome: None,
            latency: None,
            degraded: true,
        }
    }
}

impl AuditAspect {
    /// Creates an audit aspect writing to `sink` and `metrics`.
    #[must_use]
    pub fn new(sink: Arc<dyn AuditSink>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            sink: Some(sink),
            metrics,
        }
    }

    /// Creates an audit aspect without a sink. Every call runs degraded.
    #[must_use]
    pub fn without_sink(metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            sink: None,
            metrics,
        }
    }

    /// Creates an audit aspect from an optional sink.
    #[must_use]
    pub fn from_optional(sink: Option<Arc<dyn AuditSink>>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { sink, metrics }
    }

    /// Returns `true` if no audit sink is available.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.sink.is_none()
    }

    /// Runs `inner` inside an audit scope.
    ///
    /// This is the synchronous form of the aspect for callers that do not go
    /// through a pipeline. Records get a fresh invocation ID.
    ///
    /// # Errors
    ///
    /// Returns whatever `inner` returns, after recording it.
    pub fn wrap<T, F>(
        &self,
        user: &User,
        action: &str,
        spell: &str,
        details: AuditDetails,
        inner: F,
    ) -> MinistryResult<T>
    where
        F: FnOnce() -> MinistryResult<T>,
    {
        let Some(sink) = self.sink.as_deref() else {
            log_degraded(user, spell);
            return inner();
        };

        let scope = AuditScope::begin(
            sink,
            self.metrics.as_ref(),
            InvocationId::new(),
            user.clone(),
            action,
            spell,
            details,
        );
        let result = inner();
        scope.finish(&result);
        result
    }

    /// Reports a call that failed before reaching this aspect.
    ///
    /// Emits one FAILURE record and one metric sample for the failure. The
    /// `stage` detail is `authorization` when the authorization aspect denied
    /// the call, `pipeline` otherwise. Does nothing when degraded.
    pub fn record_rejection(&self, ctx: &mut InvocationContext, error: &MinistryError) {
        let Some(sink) = self.sink.as_deref() else {
            log_degraded(ctx.user(), ctx.operation_name());
            return;
        };

        let stage = match ctx.get_extension::<AuthorizationResult>() {
            Some(auth) if !auth.allowed => "authorization",
            _ => "pipeline",
        };
        let outcome = Outcome::from_error(error);
        let latency = ctx.elapsed();

        let record = AuditRecord::new(
            ctx.invocation_id(),
            ctx.user(),
            ctx.action(),
            AuditStatus::Failure,
        )
        .with_details(ctx.details().clone())
        .with_detail(DETAIL_SPELL, ctx.operation_name())
        .with_detail(DETAIL_ERROR, error.to_string())
        .with_detail(DETAIL_STAGE, stage)
        .with_error(error.to_string());
        sink.append(record);

        record_cast(self.metrics.as_ref(), ctx.operation_name(), outcome, latency);
        ctx.set_extension(AuditTrail::recorded(outcome, latency));
    }
}

impl fmt::Debug for AuditAspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditAspect")
            .field("degraded", &self.is_degraded())
            .finish_non_exhaustive()
    }
}

fn log_degraded(user: &User, spell: &str) {
    tracing::error!(
        username = user.username(),
        spell,
        "audit sink unavailable, running without audit"
    );
}

/// One open ATTEMPT waiting for its terminal record.
struct AuditScope<'s> {
    sink: &'s dyn AuditSink,
    metrics: &'s dyn MetricsSink,
    invocation_id: InvocationId,
    user: User,
    action: String,
    spell: String,
    details: AuditDetails,
    started: Instant,
}

impl<'s> AuditScope<'s> {
    fn begin(
        sink: &'s dyn AuditSink,
        metrics: &'s dyn MetricsSink,
        invocation_id: InvocationId,
        user: User,
        action: &str,
        spell: &str,
        mut details: AuditDetails,
    ) -> Self {
        details.insert(DETAIL_SPELL.to_string(), spell.to_string());

        let started = Instant::now();
        sink.append(
            AuditRecord::new(invocation_id, &user, action, AuditStatus::Attempt)
                .with_details(details.clone()),
        );

        Self {
            sink,
            metrics,
            invocation_id,
            user,
            action: action.to_string(),
            spell: spell.to_string(),
            details,
            started,
        }
    }

    fn finish<T>(self, result: &MinistryResult<T>) -> AuditTrail {
        let latency = self.started.elapsed();
        let outcome = Outcome::of(result);

        let record = match result {
            Ok(_) => {
                tracing::debug!(
                    invocation_id = %self.invocation_id,
                    spell = %self.spell,
                    latency_seconds = latency.as_secs_f64(),
                    "spell succeeded"
                );
                AuditRecord::new(
                    self.invocation_id,
                    &self.user,
                    &self.action,
                    AuditStatus::Success,
                )
                .with_details(self.details)
            }
            Err(error) => {
                let text = error.to_string();
                let mut record = AuditRecord::new(
                    self.invocation_id,
                    &self.user,
                    &self.action,
                    AuditStatus::Failure,
                )
                .with_details(self.details)
                .with_detail(DETAIL_ERROR, text.clone())
                .with_error(text);

                if matches!(error, MinistryError::ForbiddenOperation { .. }) {
                    tracing::error!(
                        invocation_id = %self.invocation_id,
                        username = self.user.username(),
                        spell = %self.spell,
                        error = %error,
                        "serious magical violation"
                    );
                    record = record.with_priority(AuditPriority::High);
                } else {
                    tracing::debug!(
                        invocation_id = %self.invocation_id,
                        spell = %self.spell,
                        status = outcome.status_label(),
                        error = %error,
                        "spell failed"
                    );
                }
                record
            }
        };

        self.sink.append(record);
        record_cast(self.metrics, &self.spell, outcome, latency);

        AuditTrail::recorded(outcome, latency)
    }
}

impl Aspect for AuditAspect {
    fn name(&self) -> &'static str {
        "audit"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut InvocationContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, AspectResult> {
        Box::pin(async move {
            let Some(sink) = self.sink.as_deref() else {
                log_degraded(ctx.user(), ctx.operation_name());
                ctx.set_extension(AuditTrail::degraded());
                return next.run(ctx).await;
            };

            let scope = AuditScope::begin(
                sink,
                self.metrics.as_ref(),
                ctx.invocation_id(),
                ctx.user().clone(),
                ctx.action(),
                ctx.operation_name(),
                ctx.details().clone(),
            );

            let result = next.run(ctx).await;

            let trail = scope.finish(&result);
            ctx.set_extension(trail);

            result
        })
    }
}
