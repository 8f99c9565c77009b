use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Identifies one magazine issue: the year of its row and its month (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoverKey {
    pub year: u32,
    pub month: u32,
}

impl CoverKey {
    pub fn new(year: u32, month: u32) -> Self {
        Self { year, month }
    }

    /// Image file name for this cover, e.g. `1994_03.jpg`.
    pub fn file_name(&self) -> String {
        format!("{self}.jpg")
    }
}

impl fmt::Display for CoverKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:02}", self.year, self.month)
    }
}

/// Sign of a page or spin command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    /// `-1.0` or `1.0`.
    pub fn sign(self) -> f32 {
        match self {
            Self::Backward => -1.0,
            Self::Forward => 1.0,
        }
    }

    /// `-1` or `1`, for cursor arithmetic.
    pub fn offset(self) -> isize {
        match self {
            Self::Backward => -1,
            Self::Forward => 1,
        }
    }
}

/// A command addressed to the row animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowCommand {
    /// Translate rows vertically and move the row cursor.
    Page(Direction),
    /// Rotate the row under the cursor around the ring axis.
    Spin(Direction),
}
