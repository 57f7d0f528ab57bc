//! Shared aliases for the aspect pipeline.

use crate::context::InvocationContext;
use ministry_core::MinistryResult;

/// What an invocation produces: the command's confirmation text or a tagged
/// failure.
pub type AspectResult = MinistryResult<String>;

/// The innermost call of a pipeline, usually "resolve the command and run it".
pub type Terminal<'a> = Box<dyn FnOnce(&mut InvocationContext) -> AspectResult + Send + 'a>;
