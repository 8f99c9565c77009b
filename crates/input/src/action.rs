use coverring_common::{Direction, RowCommand};
use serde::{Deserialize, Serialize};

/// A high-level action produced by keyboard or pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Re-centre the view on the current head orientation.
    ZeroSensor,
    /// Switch the window to full screen.
    FullScreen,
    /// Page to the row above.
    PageUp,
    /// Page to the row below.
    PageDown,
    /// Spin the current row to the left.
    SpinLeft,
    /// Spin the current row to the right.
    SpinRight,
    /// Unbound input.
    Noop,
}

impl Action {
    /// The animator command behind this action, if it has one.
    pub fn row_command(self) -> Option<RowCommand> {
        match self {
            Self::PageUp => Some(RowCommand::Page(Direction::Forward)),
            Self::PageDown => Some(RowCommand::Page(Direction::Backward)),
            Self::SpinLeft => Some(RowCommand::Spin(Direction::Backward)),
            Self::SpinRight => Some(RowCommand::Spin(Direction::Forward)),
            Self::ZeroSensor | Self::FullScreen | Self::Noop => None,
        }
    }
}
