//! wgpu render backend for the cover ring.
//!
//! Draws every cover as an instanced, textured box, once per eye viewport.
//! All cover images share one texture array; each instance picks its layer.
//!
//! # Invariants
//! - Renderer never mutates scene state.
//! - Texture layers follow the scene's row-major cover order.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
