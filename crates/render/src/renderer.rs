use crate::camera::HeadCamera;
use coverring_kernel::SceneState;
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads scene state and a camera, then produces output. It
/// never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene and camera.
    fn render(&self, scene: &SceneState, camera: &HeadCamera) -> Self::Output;
}

/// Produces a human-readable dump of the scene.
///
/// Used by the CLI and by tests that check the render interface without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Also list every cover, not just one line per row.
    pub covers: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_covers() -> Self {
        Self { covers: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &SceneState, camera: &HeadCamera) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Cover Ring (rows={}, covers={}, cursor={}) ===",
            scene.row_count(),
            scene.cover_count(),
            scene.current_row()
        );
        let eye = camera.position;
        let fwd = camera.forward();
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) forward=({:.2}, {:.2}, {:.2}) fov={:.0}",
            eye.x,
            eye.y,
            eye.z,
            fwd.x,
            fwd.y,
            fwd.z,
            camera.fov.to_degrees()
        );

        // Top row first, the way the ring is seen.
        for (index, row) in scene.rows().iter().enumerate().rev() {
            let Some(first) = row.first() else {
                continue;
            };
            let marker = if index == scene.current_row() { '>' } else { ' ' };
            let _ = writeln!(
                out,
                "{marker} row {index:>2} [{}] covers={:>2} y={:.2} offset={:.2} phase={:.3}",
                first.key.year,
                row.len(),
                first.transform.position.y,
                scene.row_offset(index).unwrap_or_default(),
                scene.row_phase(index).unwrap_or_default()
            );
            if self.covers {
                for cover in row {
                    let p = cover.transform.position;
                    let _ = writeln!(
                        out,
                        "      {} pos=({:.2}, {:.2}, {:.2})",
                        cover.key, p.x, p.y, p.z
                    );
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverring_kernel::{LayoutConfig, SceneBuilder};

    #[test]
    fn empty_scene() {
        let scene = SceneBuilder::build(&LayoutConfig {
            total_objects: 0,
            ..LayoutConfig::default()
        });
        let output = DebugTextRenderer::new().render(&scene, &HeadCamera::default());
        assert!(output.contains("rows=0"));
        assert!(output.contains("covers=0"));
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn one_line_per_row_top_first() {
        let scene = SceneBuilder::build(&LayoutConfig::default());
        let output = DebugTextRenderer::new().render(&scene, &HeadCamera::default());
        let rows: Vec<&str> = output.lines().skip(2).collect();
        assert_eq!(rows.len(), 10);
        assert!(rows[0].contains("[2003]"));
        assert!(rows[9].contains("[1994]"));
        assert!(rows[4].starts_with('>'));
        assert!(rows[4].contains("[1999]"));
        assert!(rows[4].contains("offset=0.00"));
        assert!(output.contains("fov=75"));
    }

    #[test]
    fn cover_lines_when_requested() {
        let scene = SceneBuilder::build(&LayoutConfig {
            total_objects: 14,
            ..LayoutConfig::default()
        });
        let output = DebugTextRenderer::with_covers().render(&scene, &HeadCamera::default());
        assert!(output.contains("1994_12 pos="));
        assert!(output.contains("1995_02 pos="));
        assert_eq!(output.lines().count(), 2 + 2 + 14);
    }
}
