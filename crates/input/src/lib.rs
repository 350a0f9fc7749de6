//! Input: physical keys mapped to the four dissolve sequences.
//!
//! # Invariants
//! - The controller consumes [`Action`]s, never raw keys.
//! - At most one action resolves per frame.

pub mod action;
mod bindings;
mod key;

pub use action::{Action, ParseActionError};
pub use bindings::{InputFrame, KeyBindings};
pub use key::{Key, ParseKeyError};

pub fn crate_info() -> &'static str {
    "dissolve-input v0.1.0"
}
