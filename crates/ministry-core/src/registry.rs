//! Command registry.
//!
//! The registry is the IoC container of the aspect core: it maps operation
//! names to command constructors. Names are normalized on the way in and on
//! the way out, so lookups are case-insensitive and ignore whitespace.
//!
//! Registration only happens during startup composition. Once the registry is
//! shared (usually behind an `Arc`) it is only ever read.
//!
//! # Example
//!
//! ```rust
//! use ministry_core::{Command, CommandArgs, CommandRegistry, MinistryResult, User};
//!
//! struct Lumos;
//!
//! impl Command for Lumos {
//!     fn name(&self) -> &'static str {
//!         "Lumos"
//!     }
//!
//!     fn execute(&self, _user: &User, _args: &CommandArgs) -> MinistryResult<String> {
//!         Ok("lit".to_string())
//!     }
//! }
//!
//! let mut registry = CommandRegistry::new();
//! registry.register_fn("Lumos", || Box::new(Lumos)).unwrap();
//!
//! let command = registry.resolve("LUMOS").unwrap();
//! assert_eq!(command.name(), "Lumos");
//! ```

use crate::{Command, MinistryError, MinistryResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds a fresh command instance.
pub type CommandConstructor = Arc<dyn Fn() -> Box<dyn Command> + Send + Sync>;

/// Normalizes an operation name into a registry key.
///
/// The key is lowercase with all whitespace removed.
///
/// ```
/// use ministry_core::registry::normalize;
///
/// assert_eq!(normalize("Avada Kedavra"), "avadakedavra");
/// assert_eq!(normalize(" LUMOS "), "lumos");
/// ```
#[must_use]
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A name-to-constructor registry.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    constructors: HashMap<String, CommandConstructor>,
}

impl CommandRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registers a constructor under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MinistryError::DuplicateRegistration`] if the normalized name
    /// is already taken. The existing registration is left untouched.
    pub fn register(
        &mut self,
        name: &str,
        constructor: CommandConstructor,
    ) -> MinistryResult<()> {
        let key = normalize(name);
        if self.constructors.contains_key(&key) {
            return Err(MinistryError::duplicate_registration(key));
        }

        tracing::info!(spell = %name, key = %key, "spell registered");
        self.constructors.insert(key, constructor);
        Ok(())
    }

    /// Registers a plain closure as a constructor.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_fn<F>(&mut self, name: &str, constructor: F) -> MinistryResult<()>
    where
        F: Fn() -> Box<dyn Command> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(constructor))
    }

    /// Builds a new command for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MinistryError::CommandNotFound`] carrying the name as
    /// requested. No constructor runs in that case.
    pub fn resolve(&self, name: &str) -> MinistryResult<Box<dyn Command>> {
        self.constructors
            .get(&normalize(name))
            .map(|constructor| constructor())
            .ok_or_else(|| MinistryError::command_not_found(name))
    }

    /// Checks if a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(&normalize(name))
    }

    /// Returns the registered keys, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("names", &self.names())
            .finish()
    }
}
