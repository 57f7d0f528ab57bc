//! The command capability.
//!
//! A [`Command`] is one unit of business logic tied to an operation name. It
//! knows nothing about permissions, audit or metrics; those are applied
//! around it by the aspect pipeline.

use crate::{MinistryResult, User};
use serde_json::{Map, Value};

/// Operation-specific arguments passed to a command.
pub type CommandArgs = Map<String, Value>;

/// One polymorphic unit of business logic.
///
/// Instances are built fresh for every invocation by the
/// [`CommandRegistry`](crate::CommandRegistry), so implementations never
/// share mutable state between calls.
///
/// # Example
///
/// ```
/// use ministry_core::{Command, CommandArgs, MinistryResult, User};
///
/// struct Accio;
///
/// impl Command for Accio {
///     fn name(&self) -> &'static str {
///         "Accio"
///     }
///
///     fn execute(&self, _user: &User, args: &CommandArgs) -> MinistryResult<String> {
///         let target = args.get("target").and_then(|v| v.as_str()).unwrap_or("broom");
///         Ok(format!("{target} summoned"))
///     }
/// }
///
/// let user = User::new("harry_potter", "Auror");
/// assert_eq!(Accio.execute(&user, &CommandArgs::new()).unwrap(), "broom summoned");
/// ```
pub trait Command: Send + Sync {
    /// Returns the display name of the operation.
    fn name(&self) -> &'static str;

    /// Executes the operation for `user`.
    ///
    /// Commands may enforce rules stricter than the coarse permission gate
    /// and fail with [`MinistryError::ForbiddenOperation`](crate::MinistryError::ForbiddenOperation).
    fn execute(&self, user: &User, args: &CommandArgs) -> MinistryResult<String>;
}
