//! Unforgivable curses.
//!
//! Holding `spell:cast` is not enough to cast these. The spell checks the
//! caller's role itself, so a permission model that grants too much still
//! cannot let an Auror through.

use ministry_core::{Command, CommandArgs, MinistryError, MinistryResult, User};

/// The only role allowed to cast unforgivable curses.
pub const PRIVILEGED_ROLE: &str = "Ministro";

/// The killing curse.
#[derive(Debug, Clone, Copy, Default)]
pub struct AvadaKedavra;

impl Command for AvadaKedavra {
    fn name(&self) -> &'static str {
        "Avada Kedavra"
    }

    fn execute(&self, user: &User, _args: &CommandArgs) -> MinistryResult<String> {
        if !user.has_role(PRIVILEGED_ROLE) {
            tracing::warn!(
                username = user.username(),
                role = user.role(),
                "unforgivable curse refused"
            );
            return Err(MinistryError::forbidden_operation(
                self.name(),
                user.username(),
            ));
        }

        tracing::info!(
            username = user.username(),
            "unforgivable curse cast with Ministry authorization"
        );
        Ok("Unforgivable curse cast with Ministry authorization.".to_string())
    }
}
