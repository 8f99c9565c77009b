//! Scene configuration, loadable from YAML.
//!
//! Every field has a default, so a partial file (or none at all) is valid:
//!
//! ```yaml
//! layout:
//!   total_objects: 60
//!   per_row: 12
//! animator:
//!   page_scope: current_row
//!   row_bounds: reject
//! ```

use crate::error::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which rows a page command translates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageScope {
    /// Every row moves together (the historical behaviour).
    #[default]
    AllRows,
    /// Only the row being left moves, by `scoped_page_offset`. Any row still
    /// displaced by an earlier page settles back to its rest height.
    CurrentRow,
}

/// What a page command does when the cursor would leave the row range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowBounds {
    /// Ignore the command.
    #[default]
    Clamp,
    /// Fail the command with `SceneError::RowOutOfRange`.
    Reject,
}

/// Geometry of the cover ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub total_objects: usize,
    pub per_row: usize,
    /// Year of row 0.
    pub base_year: u32,
    pub radius: f32,
    pub row_spacing: f32,
    pub eye_height: f32,
    pub cover_scale: Vec3,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            total_objects: 120,
            per_row: 12,
            base_year: 1994,
            radius: 6.0,
            row_spacing: 4.0,
            eye_height: 0.0,
            cover_scale: Vec3::new(1.0, 1.6, 0.1),
        }
    }
}

impl LayoutConfig {
    /// `ceil(total_objects / per_row)`.
    pub fn row_count(&self) -> usize {
        if self.per_row == 0 {
            return 0;
        }
        self.total_objects.div_ceil(self.per_row)
    }

    /// Angle between neighbouring covers in a row, in radians.
    pub fn slot_angle(&self) -> f32 {
        std::f32::consts::TAU / self.per_row.max(1) as f32
    }
}

/// Rates and limits of the row animator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Vertical distance per tick.
    pub page_rate: f32,
    /// Vertical distance per page command.
    pub page_limit: f32,
    /// Displacement of the departing row under `PageScope::CurrentRow`.
    /// Must stay below half the row spacing.
    pub scoped_page_offset: f32,
    /// Radians per tick.
    pub spin_rate: f32,
    /// Radians per spin command.
    pub spin_limit: f32,
    pub page_scope: PageScope,
    pub row_bounds: RowBounds,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            page_rate: 0.2,
            page_limit: 4.0,
            scoped_page_offset: 1.0,
            spin_rate: 0.2,
            spin_limit: std::f32::consts::FRAC_PI_6,
            page_scope: PageScope::default(),
            row_bounds: RowBounds::default(),
        }
    }
}

/// Complete scene configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub layout: LayoutConfig,
    pub animator: AnimatorConfig,
}

impl SceneConfig {
    /// Parse a YAML document. The result is validated.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file. The result is validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml_str(&data)?;
        tracing::debug!("loaded scene config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Check that sizes and rates are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        let layout = &self.layout;
        let animator = &self.animator;

        if layout.per_row == 0 {
            return invalid("layout.per_row", "must be at least 1");
        }
        if !positive(layout.radius) {
            return invalid("layout.radius", "must be positive");
        }
        if !positive(layout.row_spacing) {
            return invalid("layout.row_spacing", "must be positive");
        }
        if !layout.cover_scale.is_finite() {
            return invalid("layout.cover_scale", "must be finite");
        }
        if !positive(animator.page_rate) {
            return invalid("animator.page_rate", "must be positive");
        }
        if !positive(animator.page_limit) {
            return invalid("animator.page_limit", "must be positive");
        }
        if !positive(animator.scoped_page_offset) {
            return invalid("animator.scoped_page_offset", "must be positive");
        }
        if animator.scoped_page_offset * 2.0 >= layout.row_spacing {
            return invalid(
                "animator.scoped_page_offset",
                "must be less than half of layout.row_spacing",
            );
        }
        if !positive(animator.spin_rate) {
            return invalid("animator.spin_rate", "must be positive");
        }
        if !positive(animator.spin_limit) {
            return invalid("animator.spin_limit", "must be positive");
        }
        Ok(())
    }
}

fn positive(v: f32) -> bool {
    v.is_finite() && v > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layout.row_count(), 10);
        assert_eq!(config.animator.page_scope, PageScope::AllRows);
        assert_eq!(config.animator.row_bounds, RowBounds::Clamp);
    }

    #[test]
    fn row_count_rounds_up() {
        let layout = LayoutConfig {
            total_objects: 25,
            per_row: 12,
            ..LayoutConfig::default()
        };
        assert_eq!(layout.row_count(), 3);

        let empty = LayoutConfig {
            total_objects: 0,
            ..LayoutConfig::default()
        };
        assert_eq!(empty.row_count(), 0);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = SceneConfig::from_yaml_str(
            "layout:\n  total_objects: 30\nanimator:\n  page_scope: current_row\n",
        )
        .unwrap();
        assert_eq!(config.layout.total_objects, 30);
        assert_eq!(config.layout.per_row, 12);
        assert_eq!(config.animator.page_scope, PageScope::CurrentRow);
        assert_eq!(config.animator.page_limit, 4.0);
    }

    #[test]
    fn empty_yaml_is_default() {
        let config = SceneConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn zero_per_row_is_rejected() {
        let err = SceneConfig::from_yaml_str("layout:\n  per_row: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "layout.per_row",
                ..
            }
        ));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut config = SceneConfig::default();
        config.animator.spin_rate = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn scoped_offset_must_keep_rows_apart() {
        let mut config = SceneConfig::default();
        config.animator.scoped_page_offset = 2.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "animator.scoped_page_offset",
                ..
            }
        ));

        config.layout.row_spacing = 4.5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_scope_is_a_yaml_error() {
        let err = SceneConfig::from_yaml_str("animator:\n  page_scope: sideways\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "animator:\n  row_bounds: reject").unwrap();
        let config = SceneConfig::load(file.path()).unwrap();
        assert_eq!(config.animator.row_bounds, RowBounds::Reject);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
