//! The caller of an operation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated caller.
///
/// The role is an opaque key into the
/// [`PermissionModel`](crate::PermissionModel). A `User` is built once per
/// invocation and never changes while the call is in flight, so the fields
/// are private and only exposed through accessors.
///
/// # Example
///
/// ```
/// use ministry_core::User;
///
/// let user = User::new("harry_potter", "Auror");
/// assert_eq!(user.username(), "harry_potter");
/// assert_eq!(user.role(), "Auror");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    username: String,
    role: String,
}

impl User {
    /// Creates a new user with the given role.
    pub fn new(username: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: role.into(),
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the role name.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Returns `true` if the user holds exactly the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.username, self.role)
    }
}
