//! Rig changes applied behind a fade

use std::fmt;

use glam::Vec3;

use crate::ecs::level_rotation;

use super::rig::Rig;

/// The kind of rig change a transition carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Teleport,
    Rotate,
    Strafe,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Teleport => "teleport",
            Self::Rotate => "rotate",
            Self::Strafe => "strafe",
        };
        f.write_str(name)
    }
}

/// One step of a transition continuation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RigMutation {
    /// Leave the rig alone
    #[default]
    None,
    /// Move the stage so the camera ends up at `target`
    Teleport { target: Vec3 },
    /// Turn the stage about world up through the camera. Positive turns right.
    Rotate { degrees: f32 },
    /// Move the stage by `offset`, expressed in the levelled camera frame
    Strafe { offset: Vec3 },
}

impl RigMutation {
    /// Kind of transition, `None` for the no-op step
    #[must_use]
    pub const fn kind(&self) -> Option<TransitionKind> {
        match self {
            Self::None => None,
            Self::Teleport { .. } => Some(TransitionKind::Teleport),
            Self::Rotate { .. } => Some(TransitionKind::Rotate),
            Self::Strafe { .. } => Some(TransitionKind::Strafe),
        }
    }

    /// Apply the change to the rig
    pub fn apply(&self, rig: &mut Rig) {
        let camera = rig.camera();
        let mut stage = rig.stage_transform();

        match *self {
            Self::None => return,
            Self::Teleport { target } => {
                stage.position = target - (camera.position() - stage.position);
            }
            Self::Rotate { degrees } => {
                // Right-handed, Y up: a right turn is negative about +Y
                stage.rotate_around(camera.position(), Vec3::Y, -degrees.to_radians());
            }
            Self::Strafe { offset } => {
                stage.translate(level_rotation(camera.rotation()) * offset);
            }
        }

        rig.set_stage_transform(stage);
    }
}
