//! Developer tooling: read-only views of the cover ring.
//!
//! # Invariants
//! - Tools never mutate scene or animator state.

pub mod inspector;

pub use inspector::{CoverInfo, SceneInspector, SceneSummary};

pub fn crate_info() -> &'static str {
    concat!("coverring-tools v", env!("CARGO_PKG_VERSION"))
}
