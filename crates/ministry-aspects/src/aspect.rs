//! Core aspect trait and types.
//!
//! This module defines the [`Aspect`] trait that every advice implements.
//! An aspect receives the invocation context and a [`Next`] callback. It may
//! do work before calling `next`, after it, or refuse to call it at all.
//!
//! # Example
//!
//! ```ignore
//! use ministry_aspects::{Aspect, AspectResult, BoxFuture, InvocationContext, Next};
//!
//! struct LoggingAspect;
//!
//! impl Aspect for LoggingAspect {
//!     fn name(&self) -> &'static str {
//!         "logging"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut InvocationContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, AspectResult> {
//!         Box::pin(async move {
//!             println!("Invocation: {}", ctx.invocation_id());
//!             let result = next.run(ctx).await;
//!             println!("Succeeded: {}", result.is_ok());
//!             result
//!         })
//!     }
//! }
//! ```

use crate::context::InvocationContext;
use crate::types::{AspectResult, Terminal};
use std::future::Future;
use std::pin::Pin;

/// A boxed future that returns a result.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core aspect trait.
///
/// # Invariants
///
/// - An aspect MUST call `next.run()` at most once
/// - An aspect MUST NOT swallow a failure returned by `next`
/// - An aspect MUST NOT change the pipeline order
pub trait Aspect: Send + Sync + 'static {
    /// Returns the unique name of this aspect.
    ///
    /// This name is used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Applies this aspect around the rest of the chain.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The mutable invocation context
    /// * `next` - Callback to invoke the next aspect or the terminal call
    fn process<'a>(
        &'a self,
        ctx: &'a mut InvocationContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, AspectResult>;
}

/// Callback to invoke the next aspect in the chain.
///
/// If an aspect does not call it, the chain is short-circuited and the
/// terminal call never runs.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    /// More aspects to apply
    Chain {
        aspect: &'a dyn Aspect,
        next: Box<Next<'a>>,
    },
    /// End of chain - invoke the terminal call
    Terminal(Terminal<'a>),
}

impl<'a> Next<'a> {
    /// Creates a new `Next` that will invoke the given aspect.
    pub(crate) fn new(aspect: &'a dyn Aspect, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                aspect,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the wrapped call.
    pub(crate) fn terminal<F>(f: F) -> Self
    where
        F: FnOnce(&mut InvocationContext) -> AspectResult + Send + 'a,
    {
        Self {
            inner: NextInner::Terminal(Box::new(f)),
        }
    }

    /// Invokes the next aspect or the terminal call.
    ///
    /// This consumes `self` to ensure it can only be called once.
    pub async fn run(self, ctx: &mut InvocationContext) -> AspectResult {
        match self.inner {
            NextInner::Chain { aspect, next } => aspect.process(ctx, *next).await,
            NextInner::Terminal(call) => call(ctx),
        }
    }
}
