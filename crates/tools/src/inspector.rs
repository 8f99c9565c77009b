use coverring_common::CoverKey;
use coverring_kernel::{RowAnimator, SceneState};
use serde::Serialize;

/// Scene inspector for developer tooling.
///
/// Read-only queries against the ring and its animator, for the desktop HUD
/// and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene and the running animation.
    pub fn summary(scene: &SceneState, animator: &RowAnimator) -> SceneSummary {
        SceneSummary {
            rows: scene.row_count(),
            covers: scene.cover_count(),
            current_row: scene.current_row(),
            current_year: scene.current_year(),
            animation: animator.kind().label(),
            direction: animator.direction(),
            progress: animator.last(),
            limit: animator.limit(),
        }
    }

    /// Placement of one cover, or `None` if the slot does not exist.
    pub fn inspect_cover(scene: &SceneState, row: usize, slot: usize) -> Option<CoverInfo> {
        scene.cover(row, slot).map(|cover| {
            let p = cover.transform.position;
            let r = cover.transform.rotation;
            let s = cover.transform.scale;
            CoverInfo {
                key: cover.key,
                row,
                slot,
                position: [p.x, p.y, p.z],
                rotation: [r.x, r.y, r.z, r.w],
                scale: [s.x, s.y, s.z],
            }
        })
    }

    /// Every cover in row-major order.
    pub fn list_covers(scene: &SceneState) -> Vec<CoverInfo> {
        scene
            .rows()
            .iter()
            .enumerate()
            .flat_map(|(row, covers)| {
                (0..covers.len()).filter_map(move |slot| Self::inspect_cover(scene, row, slot))
            })
            .collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneSummary {
    pub rows: usize,
    pub covers: usize,
    pub current_row: usize,
    pub current_year: Option<u32>,
    /// `idle`, `page` or `spin`.
    pub animation: &'static str,
    /// `-1`, `1`, or `0` when idle.
    pub direction: i8,
    pub progress: f32,
    pub limit: f32,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Ring: rows={} covers={} cursor={}",
            self.rows, self.covers, self.current_row
        )?;
        if let Some(year) = self.current_year {
            write!(f, " [{year}]")?;
        }
        write!(f, " animation={}", self.animation)?;
        if self.animation != "idle" {
            write!(
                f,
                " {:+} ({:.3}/{:.3})",
                self.direction, self.progress, self.limit
            )?;
        }
        Ok(())
    }
}

/// Detailed info about a single cover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverInfo {
    pub key: CoverKey,
    pub row: usize,
    pub slot: usize,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl std::fmt::Display for CoverInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cover {} row={} slot={} pos=({:.2}, {:.2}, {:.2}) scale=({:.2}, {:.2}, {:.2})",
            self.key,
            self.row,
            self.slot,
            self.position[0],
            self.position[1],
            self.position[2],
            self.scale[0],
            self.scale[1],
            self.scale[2],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverring_common::{Direction, RowCommand};
    use coverring_kernel::{AnimatorConfig, LayoutConfig, SceneBuilder};

    fn scene() -> SceneState {
        SceneBuilder::build(&LayoutConfig::default())
    }

    #[test]
    fn summary_empty_scene() {
        let scene = SceneBuilder::build(&LayoutConfig {
            total_objects: 0,
            ..LayoutConfig::default()
        });
        let animator = RowAnimator::new(AnimatorConfig::default());
        let summary = SceneInspector::summary(&scene, &animator);
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.covers, 0);
        assert_eq!(summary.current_year, None);
        assert_eq!(summary.animation, "idle");
    }

    #[test]
    fn summary_tracks_running_page() {
        let mut scene = scene();
        let mut animator = RowAnimator::new(AnimatorConfig::default());
        animator
            .apply(&mut scene, RowCommand::Page(Direction::Forward))
            .unwrap();
        animator.execute(&mut scene);

        let summary = SceneInspector::summary(&scene, &animator);
        assert_eq!(summary.rows, 10);
        assert_eq!(summary.covers, 120);
        assert_eq!(summary.current_row, 6);
        assert_eq!(summary.current_year, Some(2000));
        assert_eq!(summary.animation, "page");
        assert_eq!(summary.direction, 1);
        assert!(summary.to_string().ends_with("animation=page +1 (0.200/4.000)"));
        assert!((summary.progress - 0.2).abs() < 1e-6);
        assert_eq!(summary.limit, 4.0);
    }

    #[test]
    fn inspect_cover_found() {
        let scene = scene();
        let info = SceneInspector::inspect_cover(&scene, 2, 3).unwrap();
        assert_eq!(info.key.year, 1996);
        assert_eq!(info.key.month, 4);
        let expected = scene.cover(2, 3).unwrap().transform.position;
        assert_eq!(info.position, expected.to_array());
    }

    #[test]
    fn inspect_cover_not_found() {
        let scene = scene();
        assert!(SceneInspector::inspect_cover(&scene, 10, 0).is_none());
        assert!(SceneInspector::inspect_cover(&scene, 0, 12).is_none());
    }

    #[test]
    fn list_covers_in_row_major_order() {
        let scene = SceneBuilder::build(&LayoutConfig {
            total_objects: 14,
            ..LayoutConfig::default()
        });
        let covers = SceneInspector::list_covers(&scene);
        assert_eq!(covers.len(), 14);
        assert_eq!((covers[12].row, covers[12].slot), (1, 0));
        assert!(covers.windows(2).all(|w| w[0].key < w[1].key));
    }

    #[test]
    fn displays() {
        let scene = scene();
        let animator = RowAnimator::new(AnimatorConfig::default());
        let summary = format!("{}", SceneInspector::summary(&scene, &animator));
        assert!(summary.contains("cursor=5 [1999]"));
        assert!(summary.ends_with("animation=idle"));

        let cover = format!("{}", SceneInspector::inspect_cover(&scene, 0, 0).unwrap());
        assert!(cover.starts_with("Cover 1994_01 row=0 slot=0"));
    }

    #[test]
    fn cover_info_serializes() {
        let scene = scene();
        let info = SceneInspector::inspect_cover(&scene, 0, 0).unwrap();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["key"]["year"], 1994);
        assert_eq!(json["slot"], 0);
        assert_eq!(json["position"].as_array().unwrap().len(), 3);
    }
}
