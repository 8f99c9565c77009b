//! Shared value types used by every crate in the workspace.
//!
//! # Invariants
//! - Types here carry no behaviour beyond construction and formatting.
//! - A `Direction` is always one of two signs; there is no neutral value.

pub mod types;

pub use types::{CoverKey, Direction, RowCommand, Transform};
