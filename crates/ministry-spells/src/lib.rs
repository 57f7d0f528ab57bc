//! # Ministry Spells
//!
//! The spells Ministry knows how to cast, and the policy deciding who may
//! cast them.
//!
//! | Spell | Registered as | Who may cast it |
//! |-------|---------------|-----------------|
//! | [`Lumos`] | `Lumos` | any role holding `spell:cast` |
//! | [`ExpectoPatronum`] | `Expecto Patronum` | any role holding `spell:cast` |
//! | [`AvadaKedavra`] | `Avada Kedavra` | `Ministro` only, checked by the spell itself |
//!
//! Spells contain business logic only. Authorization and auditing are
//! applied around them by `ministry-aspects`.
//!
//! ## Example
//!
//! ```
//! use ministry_core::{CommandArgs, User};
//! use ministry_spells::catalog;
//!
//! let registry = catalog::default_registry().unwrap();
//! let lumos = registry.resolve("lumos").unwrap();
//!
//! let harry = User::new("harry_potter", "Auror");
//! assert_eq!(lumos.execute(&harry, &CommandArgs::new()).unwrap(), "Wand lit! (Lumos)");
//! ```

#![doc(html_root_url = "https://docs.rs/ministry-spells/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod catalog;
mod lumos;
mod patronus;
mod unforgivable;

pub use catalog::{default_permission_model, default_registry, register_defaults};
pub use lumos::Lumos;
pub use patronus::ExpectoPatronum;
pub use unforgivable::{AvadaKedavra, PRIVILEGED_ROLE};
