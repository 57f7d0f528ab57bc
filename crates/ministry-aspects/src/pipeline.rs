//! Fixed-order aspect pipeline.
//!
//! Every invocation flows through the same stages in the same order. The
//! order comes from [`Stage`], not from the order in which the builder was
//! called, so a composition mistake cannot put auditing in front of
//! authorization.
//!
//! ## Pipeline Stages
//!
//! 1. **Authorization** - before-advice, may refuse the call
//! 2. **Audit** - around-advice, records the call and its outcome
//!
//! The terminal call (resolve the command, then execute it) runs last.
//!
//! ## Rejections
//!
//! A call refused before it reaches the audit stage leaves no audit trail of
//! its own. Unless disabled with [`PipelineBuilder::audit_rejections`], the
//! pipeline hands such failures back to the audit aspect so they are still
//! recorded once.

use crate::aspect::{Aspect, Next};
use crate::context::InvocationContext;
use crate::stages::audit::{AuditAspect, AuditTrail};
use crate::stages::authorization::AuthorizationAspect;
use crate::types::AspectResult;
use std::sync::Arc;

/// A type-erased aspect that can be stored in a vector.
pub type BoxedAspect = Arc<dyn Aspect>;

/// The fixed-order aspect pipeline.
///
/// # Example
///
/// ```
/// use ministry_aspects::{AuthorizationAspect, InvocationContext, Pipeline};
/// use ministry_core::{PermissionModel, User};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let model = PermissionModel::builder().grant("Auror", ["spell:cast"]).build();
/// let pipeline = Pipeline::builder()
///     .authorization(AuthorizationAspect::new(Arc::new(model)))
///     .build();
///
/// let mut ctx = InvocationContext::new(User::new("harry_potter", "Auror"), "spell:cast", "Lumos");
/// let result = pipeline
///     .process(&mut ctx, |_ctx| Ok("Wand lit!".to_string()))
///     .await;
///
/// assert_eq!(result.unwrap(), "Wand lit!");
/// # });
/// ```
pub struct Pipeline {
    /// Stages sorted by position.
    stages: Vec<(Stage, BoxedAspect)>,

    /// Audit aspect that records failures raised before it ran.
    rejection_auditor: Option<Arc<AuditAspect>>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Processes one invocation through every stage, then `terminal`.
    ///
    /// The result of the terminal call, or the failure that cut the chain
    /// short, is returned unchanged.
    pub async fn process<'a, H>(&'a self, ctx: &mut InvocationContext, terminal: H) -> AspectResult
    where
        H: FnOnce(&mut InvocationContext) -> AspectResult + Send + 'a,
    {
        let next = self.build_chain(terminal);
        let result = next.run(ctx).await;

        if let (Err(error), Some(auditor)) = (&result, &self.rejection_auditor) {
            if !ctx.has_extension::<AuditTrail>() {
                auditor.record_rejection(ctx, error);
            }
        }

        result
    }

    /// Builds the aspect chain for one invocation.
    fn build_chain<'a, H>(&'a self, terminal: H) -> Next<'a>
    where
        H: FnOnce(&mut InvocationContext) -> AspectResult + Send + 'a,
    {
        // Start with the terminal call and wrap outwards
        let mut next = Next::terminal(terminal);

        for (_, aspect) in self.stages.iter().rev() {
            next = Next::new(aspect.as_ref(), next);
        }

        next
    }

    /// Returns the names of all aspects in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(_, aspect)| aspect.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if authorization rejections are audited.
    #[must_use]
    pub fn audits_rejections(&self) -> bool {
        self.rejection_auditor.is_some()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("audits_rejections", &self.audits_rejections())
            .finish()
    }
}

/// Builder for constructing a [`Pipeline`].
pub struct PipelineBuilder {
    stages: Vec<(Stage, BoxedAspect)>,
    auditor: Option<Arc<AuditAspect>>,
    audit_rejections: bool,
}

impl PipelineBuilder {
    /// Creates an empty builder. Rejection auditing is on.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            auditor: None,
            audit_rejections: true,
        }
    }

    /// Adds the authorization stage.
    #[must_use]
    pub fn authorization(self, aspect: AuthorizationAspect) -> Self {
        self.add_stage(Stage::Authorization, aspect)
    }

    /// Adds the audit stage.
    ///
    /// The same aspect also records rejections raised before it runs.
    #[must_use]
    pub fn audit(mut self, aspect: AuditAspect) -> Self {
        let aspect = Arc::new(aspect);
        self.auditor = Some(Arc::clone(&aspect));
        self.stages.push((Stage::Audit, aspect as BoxedAspect));
        self
    }

    /// Adds an aspect at the given stage.
    ///
    /// Aspects run in [`Stage`] order. Aspects sharing a stage keep the
    /// order in which they were added.
    #[must_use]
    pub fn add_stage<M: Aspect>(mut self, stage: Stage, aspect: M) -> Self {
        self.stages.push((stage, Arc::new(aspect)));
        self
    }

    /// Sets whether failures raised before the audit stage are recorded.
    #[must_use]
    pub fn audit_rejections(mut self, enabled: bool) -> Self {
        self.audit_rejections = enabled;
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(mut self) -> Pipeline {
        self.stages.sort_by_key(|(stage, _)| *stage);

        Pipeline {
            stages: self.stages,
            rejection_auditor: if self.audit_rejections {
                self.auditor
            } else {
                None
            },
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pipeline stage marker.
///
/// This enum represents the fixed order of aspect stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: Authorization (before-advice)
    Authorization = 1,
    /// Stage 2: Audit and metrics (around-advice)
    Audit = 2,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Authorization => "authorization",
            Self::Audit => "audit",
        }
    }

    /// Returns the kind of advice applied at this stage.
    #[must_use]
    pub const fn advice(self) -> &'static str {
        match self {
            Self::Authorization => "before",
            Self::Audit => "around",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 2] {
        [Self::Authorization, Self::Audit]
    }
}
