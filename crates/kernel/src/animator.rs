use crate::config::{AnimatorConfig, PageScope, RowBounds};
use crate::error::SceneError;
use crate::scene::SceneState;
use coverring_common::{Direction, RowCommand};

/// Progress closer than this to the limit counts as having reached it.
const LIMIT_EPSILON: f32 = 1e-4;

/// Rows moved by a page animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowTarget {
    All,
    /// `row` travels to `offset` above its rest height while every other
    /// row settles back to rest.
    Row { row: usize, offset: f32 },
}

/// The armed animation, if any.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AnimationKind {
    #[default]
    None,
    /// Vertical page of one row or all rows.
    Translate {
        direction: Direction,
        rate: f32,
        limit: f32,
        target: RowTarget,
    },
    /// Rotation of a single row around the ring axis.
    Spin {
        direction: Direction,
        rate: f32,
        limit: f32,
        target_row: usize,
    },
}

impl AnimationKind {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// `-1`, `1`, or `0` when idle.
    pub fn direction(&self) -> i8 {
        match self {
            Self::None => 0,
            Self::Translate { direction, .. } | Self::Spin { direction, .. } => {
                direction.offset() as i8
            }
        }
    }

    /// Absolute limit, or `0.0` when idle.
    pub fn limit(&self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Translate { limit, .. } | Self::Spin { limit, .. } => *limit,
        }
    }

    /// Short label for logs and overlays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "idle",
            Self::Translate { .. } => "page",
            Self::Spin { .. } => "spin",
        }
    }

    /// Whether `progress` has reached the limit in the armed direction.
    /// Always true when idle.
    pub fn is_complete(&self, progress: f32) -> bool {
        match self {
            Self::None => true,
            Self::Translate {
                direction, limit, ..
            }
            | Self::Spin {
                direction, limit, ..
            } => limit - progress * direction.sign() <= LIMIT_EPSILON,
        }
    }
}

/// Advance an animation by one tick.
///
/// Returns the signed increment for this tick and the accumulated progress
/// after it. The final increment is clamped so progress lands on the limit.
pub fn step(kind: &AnimationKind, progress: f32) -> (f32, f32) {
    match kind {
        AnimationKind::None => (0.0, progress),
        AnimationKind::Translate {
            direction,
            rate,
            limit,
            ..
        }
        | AnimationKind::Spin {
            direction,
            rate,
            limit,
            ..
        } => {
            let sign = direction.sign();
            let remaining = (limit - progress * sign).max(0.0);
            let delta = rate.min(remaining) * sign;
            (delta, progress + delta)
        }
    }
}

/// Drives page and spin animations over a `SceneState`, one tick per frame.
///
/// Only one animation is armed at a time; arming a new one discards the old
/// one where it stands.
#[derive(Debug, Clone)]
pub struct RowAnimator {
    config: AnimatorConfig,
    kind: AnimationKind,
    last: f32,
}

impl RowAnimator {
    pub fn new(config: AnimatorConfig) -> Self {
        Self {
            config,
            kind: AnimationKind::None,
            last: 0.0,
        }
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    pub fn kind(&self) -> &AnimationKind {
        &self.kind
    }

    pub fn is_active(&self) -> bool {
        !self.kind.is_none()
    }

    /// Accumulated signed progress of the armed animation.
    pub fn last(&self) -> f32 {
        self.last
    }

    pub fn direction(&self) -> i8 {
        self.kind.direction()
    }

    pub fn limit(&self) -> f32 {
        self.kind.limit()
    }

    /// Dispatch a command from the input layer.
    pub fn apply(
        &mut self,
        scene: &mut SceneState,
        command: RowCommand,
    ) -> Result<bool, SceneError> {
        match command {
            RowCommand::Page(direction) => self.change_row(scene, direction),
            RowCommand::Spin(direction) => self.spin_row(scene, direction),
        }
    }

    /// Move the cursor one row and arm a vertical page.
    ///
    /// Returns `Ok(false)` when the clamp policy ignores a page past either
    /// end. Ignored and rejected pages leave any running animation alone.
    pub fn change_row(
        &mut self,
        scene: &mut SceneState,
        direction: Direction,
    ) -> Result<bool, SceneError> {
        let rows = scene.row_count();
        if rows == 0 {
            return Err(SceneError::NoRows);
        }

        let from = scene.current_row();
        let requested = from as isize + direction.offset();
        if requested < 0 || requested >= rows as isize {
            return match self.config.row_bounds {
                RowBounds::Clamp => {
                    tracing::debug!("page to row {requested} ignored, cursor stays at {from}");
                    Ok(false)
                }
                RowBounds::Reject => Err(SceneError::RowOutOfRange { requested, rows }),
            };
        }

        let (target, limit) = match self.config.page_scope {
            PageScope::AllRows => (RowTarget::All, self.config.page_limit),
            PageScope::CurrentRow => {
                let offset = self.config.scoped_page_offset * direction.sign();
                let target = RowTarget::Row { row: from, offset };
                (target, scene.settle_distance(from, offset))
            }
        };
        self.arm(AnimationKind::Translate {
            direction,
            rate: self.config.page_rate,
            limit,
            target,
        });
        scene.set_current_row(requested as usize);
        Ok(true)
    }

    /// Arm a spin of the row under the cursor.
    ///
    /// The target row is fixed here; moving the cursor afterwards does not
    /// retarget the spin.
    pub fn spin_row(
        &mut self,
        scene: &mut SceneState,
        direction: Direction,
    ) -> Result<bool, SceneError> {
        if scene.row_count() == 0 {
            return Err(SceneError::NoRows);
        }
        self.arm(AnimationKind::Spin {
            direction,
            rate: self.config.spin_rate,
            limit: self.config.spin_limit,
            target_row: scene.current_row(),
        });
        Ok(true)
    }

    /// Advance the armed animation by one tick.
    ///
    /// Returns whether anything moved. An animation that reaches its limit is
    /// reset in the same tick.
    pub fn execute(&mut self, scene: &mut SceneState) -> bool {
        if self.kind.is_complete(self.last) {
            self.reset();
            return false;
        }

        let (delta, progress) = step(&self.kind, self.last);
        match self.kind {
            AnimationKind::None => {}
            AnimationKind::Translate { target, .. } => match target {
                RowTarget::All => scene.translate_all(delta),
                RowTarget::Row { row, offset } => scene.settle(row, offset, delta.abs()),
            },
            AnimationKind::Spin { target_row, .. } => scene.spin(target_row, delta),
        }
        self.last = progress;

        if self.kind.is_complete(self.last) {
            tracing::debug!("{} finished at {:.3}", self.kind.label(), self.last);
            self.reset();
        }
        true
    }

    /// Return to idle.
    pub fn reset(&mut self) {
        self.kind = AnimationKind::None;
        self.last = 0.0;
    }

    fn arm(&mut self, kind: AnimationKind) {
        if self.is_active() {
            tracing::debug!(
                "{} cancelled at {:.3} of {:.3}",
                self.kind.label(),
                self.last,
                self.kind.limit()
            );
        }
        self.reset();
        tracing::debug!("{} armed: {:?}", kind.label(), kind);
        self.kind = kind;
    }
}
