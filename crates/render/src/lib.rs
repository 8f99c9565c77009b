//! Rendering Adapter: camera, stereo views and a renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene; they never mutate it.
//! - Camera motion is independent of the row animator.
//! - Eye views are derived from the camera and the rig on every frame.

mod camera;
mod renderer;
mod stereo;

pub use camera::{HeadCamera, ViewControls};
pub use renderer::{DebugTextRenderer, Renderer};
pub use stereo::{EyeView, StereoRig, Viewport};

pub fn crate_info() -> &'static str {
    concat!("coverring-render v", env!("CARGO_PKG_VERSION"))
}
