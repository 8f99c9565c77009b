//! Input mapping: raw keys and clicks become `Action`s.
//!
//! # Invariants
//! - The scene never sees raw input events, only actions.
//! - Unbound keys map to `Action::Noop`.

pub mod action;
pub mod bindings;
pub mod click;

pub use action::Action;
pub use bindings::KeyBindings;
pub use click::DoubleClick;

pub fn crate_info() -> &'static str {
    concat!("coverring-input v", env!("CARGO_PKG_VERSION"))
}
