//! User fixtures.

use ministry_core::User;

/// An Auror: may cast, may not use unforgivable curses.
#[must_use]
pub fn harry_potter() -> User {
    User::new("harry_potter", "Auror")
}

/// A Funcionario: may read, may not cast.
#[must_use]
pub fn percy_weasley() -> User {
    User::new("percy_weasley", "Funcionario")
}

/// A Ministro: holds every permission.
#[must_use]
pub fn hermione_granger() -> User {
    User::new("hermione_granger", "Ministro")
}

/// A user whose role is unknown to every permission model.
#[must_use]
pub fn muggle() -> User {
    User::new("vernon_dursley", "Muggle")
}
