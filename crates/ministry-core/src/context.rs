//! Invocation identity.
//!
//! Every operation that enters the aspect pipeline is tagged with an
//! [`InvocationId`]. The ATTEMPT and terminal audit records of one call share
//! the same id, which is what lets a reader of the audit trail pair them up.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unique identifier for each invocation, using UUID v7.
///
/// UUID v7 is time-ordered, so audit records sorted by id come out in
/// roughly the order the invocations started.
///
/// # Example
///
/// ```
/// use ministry_core::InvocationId;
///
/// let id = InvocationId::new();
/// println!("Invocation ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(Uuid);

impl InvocationId {
    /// Creates a new unique invocation ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates an `InvocationId` from an existing UUID.
    ///
    /// Transports that already carry a correlation id can reuse it here.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for InvocationId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<InvocationId> for Uuid {
    fn from(id: InvocationId) -> Self {
        id.0
    }
}
