//! Role-based permission model.
//!
//! A [`PermissionModel`] maps role names to sets of permission strings. It is
//! built once during startup and is read-only afterwards, so it can be shared
//! behind an `Arc` without any locking.
//!
//! Lookups fail closed: an unknown role holds no permissions, and a
//! permission that is not listed for a role is denied.
//!
//! # Example
//!
//! ```
//! use ministry_core::PermissionModel;
//!
//! let model = PermissionModel::builder()
//!     .grant("Funcionario", ["spell:read", "log:read"])
//!     .grant("Auror", ["spell:read", "log:read", "spell:cast"])
//!     .build();
//!
//! assert!(model.has_permission("Auror", "spell:cast"));
//! assert!(!model.has_permission("Funcionario", "spell:cast"));
//! assert!(!model.has_permission("Muggle", "spell:read"));
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

/// Static mapping from role to granted permissions.
#[derive(Debug, Clone, Default)]
pub struct PermissionModel {
    roles: HashMap<String, HashSet<String>>,
}

impl PermissionModel {
    /// Creates an empty model. Every check against it is denied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder.
    #[must_use]
    pub fn builder() -> PermissionModelBuilder {
        PermissionModelBuilder::default()
    }

    /// Creates a model from any `role -> permissions` iterator.
    pub fn from_roles<I, R, P, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = (R, P)>,
        R: Into<String>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        roles
            .into_iter()
            .fold(Self::builder(), |builder, (role, permissions)| {
                builder.grant(role, permissions)
            })
            .build()
    }

    /// Returns `true` if `role` holds `permission`.
    #[must_use]
    pub fn has_permission(&self, role: &str, permission: &str) -> bool {
        self.roles
            .get(role)
            .is_some_and(|granted| granted.contains(permission))
    }

    /// Returns a copy of the permissions held by `role`.
    ///
    /// The returned set is owned by the caller; changing it has no effect on
    /// the model.
    #[must_use]
    pub fn permissions_of(&self, role: &str) -> BTreeSet<String> {
        self.roles
            .get(role)
            .map(|granted| granted.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if the role is known to the model.
    #[must_use]
    pub fn contains_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Returns the known role names, sorted.
    #[must_use]
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self.roles.keys().map(String::as_str).collect();
        roles.sort_unstable();
        roles
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns `true` if no roles are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Builder for [`PermissionModel`].
#[derive(Debug, Default)]
pub struct PermissionModelBuilder {
    roles: HashMap<String, HashSet<String>>,
}

impl PermissionModelBuilder {
    /// Grants permissions to a role. Repeated grants accumulate.
    pub fn grant<R, P, S>(mut self, role: R, permissions: P) -> Self
    where
        R: Into<String>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .entry(role.into())
            .or_default()
            .extend(permissions.into_iter().map(Into::into));
        self
    }

    /// Declares a role with no permissions.
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.roles.entry(role.into()).or_default();
        self
    }

    /// Builds the model.
    #[must_use]
    pub fn build(self) -> PermissionModel {
        PermissionModel { roles: self.roles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ministry_like() -> PermissionModel {
        PermissionModel::builder()
            .grant("Funcionario", ["spell:read", "log:read"])
            .grant("Auror", ["spell:read", "log:read", "spell:cast"])
            .build()
    }

    #[test]
    fn test_has_permission() {
        let model = ministry_like();
        assert!(model.has_permission("Auror", "spell:cast"));
        assert!(model.has_permission("Funcionario", "log:read"));
        assert!(!model.has_permission("Funcionario", "spell:cast"));
    }

    #[test]
    fn test_unknown_role_is_denied() {
        let model = ministry_like();
        assert!(!model.has_permission("Muggle", "spell:read"));
        assert!(model.permissions_of("Muggle").is_empty());
        assert!(!model.contains_role("Muggle"));
    }

    #[test]
    fn test_empty_model_denies_everything() {
        let model = PermissionModel::new();
        assert!(model.is_empty());
        assert!(!model.has_permission("Auror", "spell:cast"));
    }

    #[test]
    fn test_permissions_of_returns_a_copy() {
        let model = ministry_like();
        let mut copy = model.permissions_of("Funcionario");
        copy.insert("spell:cast".to_string());

        assert!(!model.has_permission("Funcionario", "spell:cast"));
        assert_eq!(model.permissions_of("Funcionario").len(), 2);
    }

    #[test]
    fn test_repeated_grants_accumulate() {
        let model = PermissionModel::builder()
            .grant("Auror", ["spell:cast"])
            .grant("Auror", ["archive:read"])
            .build();
        assert_eq!(
            model.permissions_of("Auror"),
            BTreeSet::from(["archive:read".to_string(), "spell:cast".to_string()])
        );
    }

    #[test]
    fn test_declared_role_without_permissions() {
        let model = PermissionModel::builder().role("Visitante").build();
        assert!(model.contains_role("Visitante"));
        assert!(model.permissions_of("Visitante").is_empty());
    }

    #[test]
    fn test_roles_sorted() {
        let model = ministry_like();
        assert_eq!(model.roles(), vec!["Auror", "Funcionario"]);
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_from_roles() {
        let model = PermissionModel::from_roles([("Ministro", vec!["system:config"])]);
        assert!(model.has_permission("Ministro", "system:config"));
    }

    proptest! {
        #[test]
        fn prop_has_permission_iff_granted(
            roles in proptest::collection::hash_map(
                "[A-Za-z]{1,8}",
                proptest::collection::hash_set("[a-z]{1,6}:[a-z]{1,6}", 0..5),
                0..5,
            ),
            role in "[A-Za-z]{1,8}",
            permission in "[a-z]{1,6}:[a-z]{1,6}",
        ) {
            let model = PermissionModel::from_roles(roles.clone());
            let expected = roles.get(&role).is_some_and(|set| set.contains(&permission));
            prop_assert_eq!(model.has_permission(&role, &permission), expected);
        }
    }
}
