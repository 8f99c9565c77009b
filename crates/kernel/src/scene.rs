use crate::config::LayoutConfig;
use coverring_common::{CoverKey, Transform};
use glam::{Quat, Vec3};
use std::f32::consts::FRAC_PI_2;

/// One magazine cover: a scaled box on the ring.
#[derive(Debug, Clone, PartialEq)]
pub struct Cover {
    pub key: CoverKey,
    pub transform: Transform,
    /// Angular slot within the row, equal to the index in the row.
    pub slot: usize,
}

/// The ring of covers, row by row, plus the row cursor.
///
/// Rows are ordered bottom to top (row 0 is the earliest year). Within a row,
/// covers are ordered by slot, which is also their angular order.
#[derive(Debug, Clone)]
pub struct SceneState {
    rows: Vec<Vec<Cover>>,
    /// Accumulated spin angle per row, in radians.
    row_phase: Vec<f32>,
    /// Vertical displacement per row left by scoped pages.
    row_offset: Vec<f32>,
    current_row: usize,
    radius: f32,
    slot_angle: f32,
}

impl SceneState {
    pub fn rows(&self) -> &[Vec<Cover>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Cover]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cover_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// All covers in row-major order.
    pub fn covers(&self) -> impl Iterator<Item = &Cover> {
        self.rows.iter().flatten()
    }

    pub fn cover(&self, row: usize, slot: usize) -> Option<&Cover> {
        self.rows.get(row)?.get(slot)
    }

    /// Row targeted by spin commands.
    pub fn current_row(&self) -> usize {
        self.current_row
    }

    /// Year shown by the row under the cursor.
    pub fn current_year(&self) -> Option<u32> {
        self.rows
            .get(self.current_row)?
            .first()
            .map(|cover| cover.key.year)
    }

    pub fn row_phase(&self, row: usize) -> Option<f32> {
        self.row_phase.get(row).copied()
    }

    /// Height of `row` above its rest height from scoped paging.
    pub fn row_offset(&self, row: usize) -> Option<f32> {
        self.row_offset.get(row).copied()
    }

    pub(crate) fn set_current_row(&mut self, row: usize) {
        debug_assert!(row < self.rows.len());
        self.current_row = row;
    }

    /// Add `dy` to the height of every cover.
    pub(crate) fn translate_all(&mut self, dy: f32) {
        for cover in self.rows.iter_mut().flatten() {
            cover.transform.position.y += dy;
        }
    }

    /// Largest distance any row must travel for `row` to sit at `offset`
    /// and every other row at rest.
    pub(crate) fn settle_distance(&self, row: usize, offset: f32) -> f32 {
        self.row_offset
            .iter()
            .enumerate()
            .map(|(i, current)| {
                let target = if i == row { offset } else { 0.0 };
                (target - current).abs()
            })
            .fold(0.0, f32::max)
    }

    /// Move `row` toward `offset` and every other row toward rest, each by
    /// at most `amount`.
    pub(crate) fn settle(&mut self, row: usize, offset: f32, amount: f32) {
        for (i, (covers, current)) in self
            .rows
            .iter_mut()
            .zip(self.row_offset.iter_mut())
            .enumerate()
        {
            let target = if i == row { offset } else { 0.0 };
            let dy = (target - *current).clamp(-amount, amount);
            if dy == 0.0 {
                continue;
            }
            *current += dy;
            for cover in covers {
                cover.transform.position.y += dy;
            }
        }
    }

    /// Advance the spin angle of `row` by `delta` and re-place its covers on
    /// the ring, keeping their heights.
    pub(crate) fn spin(&mut self, row: usize, delta: f32) {
        let Some(phase) = self.row_phase.get_mut(row) else {
            return;
        };
        *phase += delta;
        let phase = *phase;
        let (radius, slot_angle) = (self.radius, self.slot_angle);
        for cover in &mut self.rows[row] {
            let angle = cover.slot as f32 * slot_angle + phase;
            place_on_ring(&mut cover.transform, angle, radius);
        }
    }
}

/// Position a transform on the ring at `angle`, facing the centre.
fn place_on_ring(transform: &mut Transform, angle: f32, radius: f32) {
    let (sin, cos) = angle.sin_cos();
    transform.position.x = cos * radius;
    transform.position.z = sin * radius;
    transform.rotation = Quat::from_rotation_y(FRAC_PI_2 - angle);
}

/// Builds the initial ring of covers.
pub struct SceneBuilder;

impl SceneBuilder {
    /// Lay out `ceil(total / per_row)` rows on a ring.
    ///
    /// The middle row (`row_count / 2`) sits at eye height; the others are
    /// stacked `row_spacing` apart. The cursor starts on that middle row.
    pub fn build(layout: &LayoutConfig) -> SceneState {
        let row_count = layout.row_count();
        let per_row = layout.per_row;
        // No rows at all when `per_row` is zero.
        let total = if row_count == 0 { 0 } else { layout.total_objects };
        let slot_angle = layout.slot_angle();
        let middle = row_count / 2;

        let mut rows: Vec<Vec<Cover>> = Vec::with_capacity(row_count);
        for i in 0..total {
            let row = i / per_row;
            let slot = i % per_row;
            if slot == 0 {
                rows.push(Vec::with_capacity(per_row));
            }

            let y = layout.eye_height + (row as f32 - middle as f32) * layout.row_spacing;
            let mut transform = Transform {
                position: Vec3::new(0.0, y, 0.0),
                scale: layout.cover_scale,
                ..Transform::default()
            };
            place_on_ring(&mut transform, slot as f32 * slot_angle, layout.radius);

            rows[row].push(Cover {
                key: CoverKey::new(layout.base_year + row as u32, slot as u32 + 1),
                transform,
                slot,
            });
        }

        tracing::debug!(
            "built scene: {} covers in {} rows of {}",
            total,
            rows.len(),
            per_row
        );

        SceneState {
            row_phase: vec![0.0; rows.len()],
            row_offset: vec![0.0; rows.len()],
            rows,
            current_row: middle.min(row_count.saturating_sub(1)),
            radius: layout.radius,
            slot_angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(total_objects: usize, per_row: usize) -> LayoutConfig {
        LayoutConfig {
            total_objects,
            per_row,
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn default_scene_has_ten_full_rows() {
        let scene = SceneBuilder::build(&LayoutConfig::default());
        assert_eq!(scene.row_count(), 10);
        assert_eq!(scene.cover_count(), 120);
        for row in scene.rows() {
            assert_eq!(row.len(), 12);
        }
        assert_eq!(scene.row(9).unwrap().len(), 12);
    }

    #[test]
    fn partial_last_row() {
        let scene = SceneBuilder::build(&layout(27, 12));
        assert_eq!(scene.row_count(), 3);
        assert_eq!(scene.row(0).unwrap().len(), 12);
        assert_eq!(scene.row(1).unwrap().len(), 12);
        assert_eq!(scene.row(2).unwrap().len(), 3);
        assert!(scene.cover(2, 3).is_none());
        assert!(scene.row(3).is_none());
    }

    #[test]
    fn empty_scene() {
        let scene = SceneBuilder::build(&layout(0, 12));
        assert_eq!(scene.row_count(), 0);
        assert_eq!(scene.current_row(), 0);
        assert_eq!(scene.current_year(), None);
    }

    #[test]
    fn keys_follow_row_and_slot() {
        let scene = SceneBuilder::build(&LayoutConfig::default());
        let first = scene.cover(0, 0).unwrap();
        assert_eq!(first.key, CoverKey::new(1994, 1));
        let last = scene.cover(9, 11).unwrap();
        assert_eq!(last.key, CoverKey::new(2003, 12));
        assert_eq!(last.key.file_name(), "2003_12.jpg");
    }

    #[test]
    fn covers_sit_on_the_ring() {
        let config = LayoutConfig::default();
        let scene = SceneBuilder::build(&config);
        for cover in scene.covers() {
            let p = cover.transform.position;
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - config.radius).abs() < 1e-4);
            assert_eq!(cover.transform.scale, config.cover_scale);
        }
        let quarter = scene.cover(0, 3).unwrap().transform.position;
        assert!(quarter.x.abs() < 1e-4);
        assert!((quarter.z - 6.0).abs() < 1e-4);
    }

    #[test]
    fn covers_face_the_centre() {
        let scene = SceneBuilder::build(&LayoutConfig::default());
        for cover in scene.covers() {
            // Local -Z of the box points back at the ring axis.
            let inward = cover.transform.rotation * Vec3::NEG_Z;
            let to_centre = Vec3::new(
                -cover.transform.position.x,
                0.0,
                -cover.transform.position.z,
            )
            .normalize();
            assert!(inward.abs_diff_eq(to_centre, 1e-4));
        }
    }

    #[test]
    fn middle_row_is_at_eye_height() {
        let config = LayoutConfig {
            eye_height: 1.5,
            ..LayoutConfig::default()
        };
        let scene = SceneBuilder::build(&config);
        assert_eq!(scene.current_row(), 5);
        assert_eq!(scene.current_year(), Some(1999));
        for cover in scene.row(5).unwrap() {
            assert!((cover.transform.position.y - 1.5).abs() < 1e-5);
        }
        let below = scene.cover(4, 0).unwrap().transform.position.y;
        assert!((below - (1.5 - 4.0)).abs() < 1e-5);
    }

    #[test]
    fn translate_all_moves_every_row() {
        let mut scene = SceneBuilder::build(&layout(24, 12));
        let y0 = scene.cover(0, 0).unwrap().transform.position.y;
        let y1 = scene.cover(1, 5).unwrap().transform.position.y;

        scene.translate_all(-0.5);
        assert_eq!(scene.cover(0, 0).unwrap().transform.position.y, y0 - 0.5);
        assert_eq!(scene.cover(1, 5).unwrap().transform.position.y, y1 - 0.5);
        assert_eq!(scene.row_offset(0), Some(0.0));
    }

    #[test]
    fn settle_moves_rows_toward_their_targets() {
        let close = |a: f32, b: f32| (a - b).abs() < 1e-5;
        let mut scene = SceneBuilder::build(&layout(36, 12));
        let rest: Vec<f32> = (0..3)
            .map(|row| scene.cover(row, 0).unwrap().transform.position.y)
            .collect();
        let height = |scene: &SceneState, row| scene.cover(row, 4).unwrap().transform.position.y;

        scene.settle(1, 1.0, 0.4);
        assert!(close(scene.row_offset(1).unwrap(), 0.4));
        assert_eq!(scene.row_offset(0), Some(0.0));
        scene.settle(1, 1.0, 0.8);
        assert!(close(scene.row_offset(1).unwrap(), 1.0));
        assert!(scene.settle_distance(1, 1.0) < 1e-5);

        // Retargeting lifts row 2 while row 1 returns to rest.
        assert!(close(scene.settle_distance(2, -1.0), 1.0));
        scene.settle(2, -1.0, 1.0);
        assert!(close(height(&scene, 1), rest[1]));
        assert!(close(height(&scene, 2), rest[2] - 1.0));
        assert_eq!(height(&scene, 0), rest[0]);

        // Out-of-range rows only settle the others.
        scene.settle(7, 1.0, 2.0);
        assert_eq!(scene.row_offset(2), Some(0.0));
        assert!(close(height(&scene, 2), rest[2]));
    }

    #[test]
    fn zero_per_row_builds_no_rows() {
        let scene = SceneBuilder::build(&layout(30, 0));
        assert_eq!(scene.row_count(), 0);
        assert_eq!(scene.cover_count(), 0);
        assert_eq!(scene.row_count(), layout(30, 0).row_count());
    }

    #[test]
    fn spin_by_one_slot_shifts_positions() {
        let config = LayoutConfig::default();
        let mut scene = SceneBuilder::build(&config);
        let before: Vec<Vec3> = scene
            .row(2)
            .unwrap()
            .iter()
            .map(|c| c.transform.position)
            .collect();

        scene.spin(2, config.slot_angle());

        let after = scene.row(2).unwrap();
        for slot in 0..11 {
            assert!(after[slot].transform.position.abs_diff_eq(before[slot + 1], 1e-4));
        }
        assert!((scene.row_phase(2).unwrap() - config.slot_angle()).abs() < 1e-6);
        assert_eq!(scene.row_phase(3), Some(0.0));
    }
}
