use ministry_core::{Command, CommandArgs, MinistryResult, User};

/// Lights the caster's wand.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lumos;

impl Command for Lumos {
    fn name(&self) -> &'static str {
        "Lumos"
    }

    fn execute(&self, user: &User, _args: &CommandArgs) -> MinistryResult<String> {
        tracing::info!(username = user.username(), "wand lit");
        Ok("Wand lit! (Lumos)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lumos_always_succeeds() {
        for role in ["Funcionario", "Auror", "Ministro", "Muggle"] {
            let user = User::new("anyone", role);
            let result = Lumos.execute(&user, &CommandArgs::new()).unwrap();
            assert_eq!(result, "Wand lit! (Lumos)");
        }
    }
}
