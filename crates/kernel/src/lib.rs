//! Scene kernel: the ring of covers and the row animator that moves it.
//!
//! # Invariants
//! - `SceneState` is owned by the caller; nothing here is global.
//! - At most one animation is armed at any time.
//! - The row cursor always indexes an existing row.

pub mod animator;
pub mod config;
pub mod error;
pub mod scene;

pub use animator::{step, AnimationKind, RowAnimator, RowTarget};
pub use config::{AnimatorConfig, LayoutConfig, PageScope, RowBounds, SceneConfig};
pub use error::{ConfigError, SceneError};
pub use scene::{Cover, SceneBuilder, SceneState};
