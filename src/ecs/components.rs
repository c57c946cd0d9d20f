//! Rig components

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Transform component for position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in parent space
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
    /// Scale factor
    pub scale: Vec3,
}

impl Transform {
    /// Create a new transform at the origin
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    #[must_use]
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Get the transformation matrix
    #[must_use]
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in local space)
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Translate by a delta
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotate about an axis through `pivot`, keeping the pivot fixed.
    pub fn rotate_around(&mut self, pivot: Vec3, axis: Vec3, angle: f32) {
        let turn = Quat::from_axis_angle(axis.normalize(), angle);
        self.position = pivot + turn * (self.position - pivot);
        self.rotation = (turn * self.rotation).normalize();
    }
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

/// Drop pitch and roll from a rotation, keeping only the heading about Y.
///
/// When the forward vector is vertical the heading is taken from the right
/// vector instead.
#[must_use]
pub fn level_rotation(rotation: Quat) -> Quat {
    let forward = rotation * Vec3::NEG_Z;
    let flat = Vec3::new(forward.x, 0.0, forward.z);

    let yaw = if flat.length_squared() > 1e-6 {
        (-flat.x).atan2(-flat.z)
    } else {
        let right = rotation * Vec3::X;
        (-right.z).atan2(right.x)
    };

    Quat::from_rotation_y(yaw)
}

/// Root of the tracked play space. Moving it moves the user.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stage;

/// The tracked head, parented to the [`Stage`]. Its world pose is the main
/// camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct Head;
