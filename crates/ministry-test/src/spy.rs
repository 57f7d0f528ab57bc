//! Spy constructors and test commands.

use ministry_core::{Command, CommandArgs, CommandConstructor, MinistryError, MinistryResult, User};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts how many commands a wrapped constructor has built.
///
/// Clones share the same count.
///
/// # Example
///
/// ```
/// use ministry_core::CommandRegistry;
/// use ministry_test::{failing_constructor, ConstructionCounter};
///
/// let counter = ConstructionCounter::new();
/// let mut registry = CommandRegistry::new();
/// registry
///     .register("Fizzle", counter.wrap(failing_constructor("no wand")))
///     .unwrap();
///
/// assert_eq!(counter.count(), 0);
/// let _ = registry.resolve("fizzle").unwrap();
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConstructionCounter {
    count: Arc<AtomicUsize>,
}

impl ConstructionCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps `constructor` so every call is counted.
    #[must_use]
    pub fn wrap(&self, constructor: CommandConstructor) -> CommandConstructor {
        let count = Arc::clone(&self.count);
        Arc::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
            constructor()
        })
    }

    /// Returns the number of commands built so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// A command that always fails with a logic error.
#[derive(Debug, Clone)]
pub struct FailingCommand {
    message: String,
}

impl FailingCommand {
    /// Creates a command failing with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Command for FailingCommand {
    fn name(&self) -> &'static str {
        "Fizzle"
    }

    fn execute(&self, _user: &User, _args: &CommandArgs) -> MinistryResult<String> {
        Err(MinistryError::logic(self.message.clone()))
    }
}

/// Returns a constructor building [`FailingCommand`]s.
#[must_use]
pub fn failing_constructor(message: impl Into<String>) -> CommandConstructor {
    let message = message.into();
    Arc::new(move || Box::new(FailingCommand::new(message.clone())) as Box<dyn Command>)
}
