use ministry_core::{Command, CommandArgs, MinistryResult, User};

/// Conjures a Patronus.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectoPatronum;

impl Command for ExpectoPatronum {
    fn name(&self) -> &'static str {
        "Expecto Patronum"
    }

    fn execute(&self, user: &User, _args: &CommandArgs) -> MinistryResult<String> {
        tracing::info!(username = user.username(), "patronus conjured");
        Ok("Patronus conjured for defense.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patronus_succeeds() {
        let user = User::new("harry_potter", "Auror");
        let result = ExpectoPatronum.execute(&user, &CommandArgs::new()).unwrap();
        assert_eq!(result, "Patronus conjured for defense.");
        assert_eq!(ExpectoPatronum.name(), "Expecto Patronum");
    }
}
