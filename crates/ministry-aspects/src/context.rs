//! Invocation context.
//!
//! The [`InvocationContext`] carries one operation request through the aspect
//! pipeline: who is calling, what they want to run, what permission it needs,
//! and the details that end up in the audit trail. Aspects can also leave
//! typed extensions behind for later stages or the caller to inspect.

use ministry_core::{CommandArgs, InvocationId, User};
use ministry_telemetry::AuditDetails;
use serde_json::Value;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Action name used when none is given.
pub const DEFAULT_ACTION: &str = "cast_spell";

/// Context that flows through the aspect pipeline.
///
/// Each invocation gets its own context, so nothing in it is shared between
/// concurrent calls.
///
/// # Example
///
/// ```
/// use ministry_aspects::context::InvocationContext;
/// use ministry_core::User;
///
/// let ctx = InvocationContext::new(User::new("harry_potter", "Auror"), "spell:cast", "Lumos")
///     .with_arg("incantation", "Lumos!")
///     .with_detail("request", "Lumos by harry_potter");
///
/// assert_eq!(ctx.operation_name(), "Lumos");
/// assert_eq!(ctx.action(), "cast_spell");
/// assert_eq!(ctx.args()["incantation"], "Lumos!");
/// ```
#[derive(Debug)]
pub struct InvocationContext {
    /// Unique identifier for this invocation.
    invocation_id: InvocationId,

    /// The caller.
    user: User,

    /// Permission the authorization aspect checks.
    required_permission: String,

    /// Operation name as requested.
    operation_name: String,

    /// Audited action name.
    action: String,

    /// Arguments passed to the command.
    args: CommandArgs,

    /// Caller-supplied audit details.
    details: AuditDetails,

    /// When the invocation entered the pipeline.
    started_at: Instant,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl InvocationContext {
    /// Creates a new context with a fresh invocation ID.
    pub fn new(
        user: User,
        required_permission: impl Into<String>,
        operation_name: impl Into<String>,
    ) -> Self {
        Self {
            invocation_id: InvocationId::new(),
            user,
            required_permission: required_permission.into(),
            operation_name: operation_name.into(),
            action: DEFAULT_ACTION.to_string(),
            args: CommandArgs::new(),
            details: AuditDetails::new(),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Reuses an invocation ID supplied by the transport.
    #[must_use]
    pub fn with_invocation_id(mut self, invocation_id: InvocationId) -> Self {
        self.invocation_id = invocation_id;
        self
    }

    /// Sets the audited action name.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    /// Replaces the command arguments.
    #[must_use]
    pub fn with_args(mut self, args: CommandArgs) -> Self {
        self.args = args;
        self
    }

    /// Adds one command argument.
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(key.into(), value.into());
        self
    }

    /// Adds one audit detail.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_detail(key, value);
        self
    }

    /// Adds one audit detail in place.
    pub fn insert_detail(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.details.insert(key.into(), value.into());
    }

    /// Returns the invocation ID.
    #[must_use]
    pub fn invocation_id(&self) -> InvocationId {
        self.invocation_id
    }

    /// Returns the caller.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Returns the permission the operation requires.
    #[must_use]
    pub fn required_permission(&self) -> &str {
        &self.required_permission
    }

    /// Returns the operation name as requested.
    #[must_use]
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    /// Returns the audited action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the command arguments.
    #[must_use]
    pub fn args(&self) -> &CommandArgs {
        &self.args
    }

    /// Returns the caller-supplied audit details.
    #[must_use]
    pub fn details(&self) -> &AuditDetails {
        &self.details
    }

    /// Returns when the invocation started.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the invocation started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value.
    ///
    /// # Example
    ///
    /// ```
    /// use ministry_aspects::context::InvocationContext;
    /// use ministry_core::User;
    ///
    /// struct Wand {
    ///     core: &'static str,
    /// }
    ///
    /// let mut ctx = InvocationContext::new(User::new("harry_potter", "Auror"), "spell:cast", "Lumos");
    /// ctx.set_extension(Wand { core: "phoenix feather" });
    ///
    /// assert_eq!(ctx.get_extension::<Wand>().unwrap().core, "phoenix feather");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}
