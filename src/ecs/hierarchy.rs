//! Entity hierarchy components
//!
//! Provides parent-child relationships between rig entities and resolves
//! world-space transforms through them.

use glam::{Mat4, Quat, Vec3};
use hecs::{Entity, World};

use super::components::Transform;

/// Parent component - indicates this entity has a parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

impl Parent {
    /// Create a new parent reference
    #[must_use]
    pub const fn new(entity: Entity) -> Self {
        Self(entity)
    }

    /// Get the parent entity
    #[must_use]
    pub const fn entity(&self) -> Entity {
        self.0
    }
}

/// Global transform - computed world-space transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform {
    /// World-space transformation matrix
    pub matrix: Mat4,
}

impl GlobalTransform {
    /// Create from a transformation matrix
    #[must_use]
    pub const fn new(matrix: Mat4) -> Self {
        Self { matrix }
    }

    /// Create identity transform
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: Mat4::IDENTITY,
        }
    }

    /// Get world position
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.matrix.col(3).truncate()
    }

    /// Get world rotation
    #[must_use]
    pub fn rotation(&self) -> Quat {
        let (_, rotation, _) = self.matrix.to_scale_rotation_translation();
        rotation
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Resolve the world-space transform of an entity by walking its parents.
///
/// Returns `None` if the entity, or any ancestor, has no [`Transform`].
#[must_use]
pub fn global_transform(world: &World, entity: Entity) -> Option<GlobalTransform> {
    let local = world.get::<&Transform>(entity).ok()?.matrix();
    let parent = world.get::<&Parent>(entity).ok().map(|p| p.entity());

    match parent {
        Some(parent) => {
            let parent_global = global_transform(world, parent)?;
            Some(GlobalTransform::new(parent_global.matrix * local))
        }
        None => Some(GlobalTransform::new(local)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_global_transform() {
        let mut world = World::new();
        let root = world.spawn((Transform::from_position_rotation(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_y(FRAC_PI_2),
        ),));
        let child = world.spawn((
            Transform::from_position(Vec3::new(0.0, 1.5, -1.0)),
            Parent::new(root),
        ));

        let global = global_transform(&world, child).unwrap();
        let pos = global.position();
        assert!((pos.x - 9.0).abs() < 0.001);
        assert!((pos.y - 1.5).abs() < 0.001);
        assert!(pos.z.abs() < 0.001);
    }

    #[test]
    fn test_missing_transform() {
        let mut world = World::new();
        let orphan = world.spawn(());
        assert!(global_transform(&world, orphan).is_none());
    }
}
