//! Input events consumed by the locomotion classifier

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier of a physical input source (a motion controller, a hand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source {}", self.0)
    }
}

/// Which control produced a positional event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressKind {
    /// Analog thumbstick
    Thumbstick,
    /// Touchpad surface
    Touchpad,
    /// Trigger / select
    Select,
    /// Grip / grasp
    Grasp,
    /// Menu button
    Menu,
}

/// One unit of input for the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Per-frame sample of the two gamepad sticks.
    Axis {
        /// Movement stick (x right, y forward)
        movement: Vec2,
        /// Rotation stick (x right, y forward)
        rotation: Vec2,
    },
    /// A motion controller reported a new 2D control position.
    PositionChanged {
        /// Control that moved
        press: PressKind,
        /// Control position, roughly in [-1, 1]
        position: Vec2,
        /// Controller that reported it
        source: SourceId,
    },
}

/// Who started the current teleport aim.
///
/// Only the same origin can later confirm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AimOrigin {
    /// The gamepad movement stick
    Gamepad,
    /// A motion controller thumbstick
    Source(SourceId),
}

impl AimOrigin {
    /// Source id, for aims started by a motion controller
    #[must_use]
    pub const fn source_id(self) -> Option<SourceId> {
        match self {
            Self::Gamepad => None,
            Self::Source(id) => Some(id),
        }
    }
}
