//! The Ministry policy and default registrations.
//!
//! Roles build on each other: every rank holds everything the rank below
//! holds, plus its own grants.
//!
//! | Role | Adds |
//! |------|------|
//! | `Funcionario` | `spell:read`, `log:read` |
//! | `Auror` | `spell:cast`, `archive:read` |
//! | `JefeDeDepartamento` | `archive:write`, `user:manage_interns` |
//! | `Ministro` | `user:admin`, `system:config` |

use crate::{AvadaKedavra, ExpectoPatronum, Lumos};
use ministry_core::{Command, CommandRegistry, MinistryResult, PermissionModel};

/// Clerk. Read-only access.
pub const FUNCIONARIO: &str = "Funcionario";
/// Dark wizard catcher. May cast spells.
pub const AUROR: &str = "Auror";
/// Head of department.
pub const JEFE_DE_DEPARTAMENTO: &str = "JefeDeDepartamento";
/// Minister for Magic. Holds every permission.
pub const MINISTRO: &str = "Ministro";

/// Permission strings used by the Ministry policy.
pub mod permissions {
    /// Read spell definitions.
    pub const SPELL_READ: &str = "spell:read";
    /// Read the audit log.
    pub const LOG_READ: &str = "log:read";
    /// Cast a spell.
    pub const SPELL_CAST: &str = "spell:cast";
    /// Read the archive.
    pub const ARCHIVE_READ: &str = "archive:read";
    /// Write to the archive.
    pub const ARCHIVE_WRITE: &str = "archive:write";
    /// Manage interns.
    pub const USER_MANAGE_INTERNS: &str = "user:manage_interns";
    /// Administer users.
    pub const USER_ADMIN: &str = "user:admin";
    /// Change system configuration.
    pub const SYSTEM_CONFIG: &str = "system:config";
}

use self::permissions::{
    ARCHIVE_READ, ARCHIVE_WRITE, LOG_READ, SPELL_CAST, SPELL_READ, SYSTEM_CONFIG, USER_ADMIN,
    USER_MANAGE_INTERNS,
};

/// Builds the Ministry permission model.
#[must_use]
pub fn default_permission_model() -> PermissionModel {
    let funcionario = [SPELL_READ, LOG_READ];
    let auror = [SPELL_CAST, ARCHIVE_READ];
    let jefe = [ARCHIVE_WRITE, USER_MANAGE_INTERNS];
    let ministro = [USER_ADMIN, SYSTEM_CONFIG];

    PermissionModel::builder()
        .grant(FUNCIONARIO, funcionario)
        .grant(AUROR, funcionario)
        .grant(AUROR, auror)
        .grant(JEFE_DE_DEPARTAMENTO, funcionario)
        .grant(JEFE_DE_DEPARTAMENTO, auror)
        .grant(JEFE_DE_DEPARTAMENTO, jefe)
        .grant(MINISTRO, funcionario)
        .grant(MINISTRO, auror)
        .grant(MINISTRO, jefe)
        .grant(MINISTRO, ministro)
        .build()
}

/// Registers every known spell.
///
/// # Errors
///
/// Returns `MinistryError::DuplicateRegistration` if `registry` already
/// holds one of the names.
pub fn register_defaults(registry: &mut CommandRegistry) -> MinistryResult<()> {
    registry.register_fn("Lumos", || Box::new(Lumos) as Box<dyn Command>)?;
    registry.register_fn("Expecto Patronum", || {
        Box::new(ExpectoPatronum) as Box<dyn Command>
    })?;
    registry.register_fn("Avada Kedavra", || Box::new(AvadaKedavra) as Box<dyn Command>)?;
    Ok(())
}

/// Builds a registry holding every known spell.
///
/// # Errors
///
/// Same as [`register_defaults`].
pub fn default_registry() -> MinistryResult<CommandRegistry> {
    let mut registry = CommandRegistry::new();
    register_defaults(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ministry_core::{CommandArgs, MinistryError, User};
    use proptest::prelude::*;

    #[test]
    fn test_policy_grants() {
        let model = default_permission_model();

        assert!(!model.has_permission(FUNCIONARIO, SPELL_CAST));
        assert!(model.has_permission(FUNCIONARIO, LOG_READ));
        assert!(model.has_permission(AUROR, SPELL_CAST));
        assert!(!model.has_permission(AUROR, ARCHIVE_WRITE));
        assert!(model.has_permission(JEFE_DE_DEPARTAMENTO, USER_MANAGE_INTERNS));
        assert!(!model.has_permission(JEFE_DE_DEPARTAMENTO, USER_ADMIN));
        assert!(model.has_permission(MINISTRO, SYSTEM_CONFIG));
        assert!(!model.has_permission("Muggle", SPELL_READ));
    }

    #[test]
    fn test_policy_permission_counts() {
        let model = default_permission_model();
        assert_eq!(model.permissions_of(FUNCIONARIO).len(), 2);
        assert_eq!(model.permissions_of(AUROR).len(), 4);
        assert_eq!(model.permissions_of(JEFE_DE_DEPARTAMENTO).len(), 6);
        assert_eq!(model.permissions_of(MINISTRO).len(), 8);
        assert_eq!(
            model.roles(),
            vec![AUROR, FUNCIONARIO, JEFE_DE_DEPARTAMENTO, MINISTRO]
        );
    }

    #[test]
    fn test_default_registry_names() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.len(), 3);
        for name in ["Lumos", "lumos", "Expecto Patronum", "expectopatronum", "AvadaKedavra"] {
            assert!(registry.contains(name), "{name} should resolve");
        }
    }

    #[test]
    fn test_resolved_spells_execute() {
        let registry = default_registry().unwrap();
        let harry = User::new("harry_potter", AUROR);

        let patronus = registry.resolve("EXPECTO PATRONUM").unwrap();
        assert_eq!(patronus.name(), "Expecto Patronum");
        assert!(!patronus.execute(&harry, &CommandArgs::new()).unwrap().is_empty());

        let curse = registry.resolve("avada kedavra").unwrap();
        assert!(matches!(
            curse.execute(&harry, &CommandArgs::new()),
            Err(MinistryError::ForbiddenOperation { .. })
        ));
    }

    #[test]
    fn test_register_defaults_twice_fails() {
        let mut registry = default_registry().unwrap();
        let err = register_defaults(&mut registry).unwrap_err();
        assert!(matches!(err, MinistryError::DuplicateRegistration { .. }));
        assert_eq!(registry.len(), 3);
    }

    proptest! {
        #[test]
        fn test_higher_ranks_hold_lower_grants(permission in prop::sample::select(vec![
            SPELL_READ, LOG_READ, SPELL_CAST, ARCHIVE_READ,
            ARCHIVE_WRITE, USER_MANAGE_INTERNS, USER_ADMIN, SYSTEM_CONFIG,
        ])) {
            let model = default_permission_model();
            let ranks = [FUNCIONARIO, AUROR, JEFE_DE_DEPARTAMENTO, MINISTRO];

            for pair in ranks.windows(2) {
                if model.has_permission(pair[0], permission) {
                    prop_assert!(model.has_permission(pair[1], permission));
                }
            }
        }
    }
}
