//! Locomotion rig
//!
//! The rig is a small hecs world with three entities:
//!
//! - the **stage**, root of the tracked play space, which locomotion moves
//! - the **head**, parented to the stage and posed by the headset each frame;
//!   its world pose is the main camera
//! - the **marker**, spawned once from a template and shown while aiming

use glam::Vec3;
use hecs::{Entity, World};

use crate::core::MarkerTemplate;
use crate::ecs::{GlobalTransform, Head, Parent, Stage, Transform, global_transform};

use super::marker::TeleportMarker;

/// Stage, head and marker entities of one user
pub struct Rig {
    world: World,
    stage: Entity,
    head: Entity,
    marker: Option<Entity>,
}

impl Rig {
    /// Create a rig with the stage at `stage` and the head at `head` relative
    /// to it
    #[must_use]
    pub fn new(stage: Transform, head: Transform) -> Self {
        let mut world = World::new();
        let stage_entity = world.spawn((Stage, stage));
        let head_entity = world.spawn((Head, head, Parent::new(stage_entity)));

        Self {
            world,
            stage: stage_entity,
            head: head_entity,
            marker: None,
        }
    }

    /// Rig standing at the origin with the head `eye_height` above the stage
    #[must_use]
    pub fn standing(eye_height: f32) -> Self {
        Self::new(
            Transform::new(),
            Transform::from_position(Vec3::new(0.0, eye_height, 0.0)),
        )
    }

    /// The underlying world, for hosts that render rig entities
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub const fn stage_entity(&self) -> Entity {
        self.stage
    }

    #[must_use]
    pub const fn head_entity(&self) -> Entity {
        self.head
    }

    #[must_use]
    pub const fn marker_entity(&self) -> Option<Entity> {
        self.marker
    }

    fn local(&self, entity: Entity) -> Transform {
        self.world
            .get::<&Transform>(entity)
            .map(|t| *t)
            .unwrap_or_default()
    }

    fn set_local(&mut self, entity: Entity, transform: Transform) {
        if let Ok(mut current) = self.world.get::<&mut Transform>(entity) {
            *current = transform;
        }
    }

    /// World transform of the stage
    #[must_use]
    pub fn stage_transform(&self) -> Transform {
        self.local(self.stage)
    }

    /// Move the stage
    pub fn set_stage_transform(&mut self, transform: Transform) {
        self.set_local(self.stage, transform);
    }

    /// Head pose relative to the stage
    #[must_use]
    pub fn head_pose(&self) -> Transform {
        self.local(self.head)
    }

    /// Update the tracked head pose (relative to the stage)
    pub fn set_head_pose(&mut self, pose: Transform) {
        self.set_local(self.head, pose);
    }

    /// World pose of the main camera
    #[must_use]
    pub fn camera(&self) -> GlobalTransform {
        global_transform(&self.world, self.head).unwrap_or_default()
    }

    /// Spawn the marker from its template. Only the first call spawns.
    pub fn spawn_marker(&mut self, template: &MarkerTemplate) -> Entity {
        if let Some(marker) = self.marker {
            return marker;
        }

        let transform = Transform {
            scale: Vec3::splat(template.scale),
            ..Transform::default()
        };
        let marker = self
            .world
            .spawn((TeleportMarker::from_template(template), transform));
        self.marker = Some(marker);
        marker
    }

    /// Run `f` against the marker and its transform
    pub fn with_marker<R>(
        &mut self,
        f: impl FnOnce(&mut TeleportMarker, &mut Transform) -> R,
    ) -> Option<R> {
        let marker = self.marker?;
        let mut query = self
            .world
            .query_one::<(&mut TeleportMarker, &mut Transform)>(marker)
            .ok()?;
        let (component, transform) = query.get()?;
        Some(f(component, transform))
    }

    /// Marker world position
    #[must_use]
    pub fn marker_position(&self) -> Option<Vec3> {
        self.marker.map(|marker| self.local(marker).position)
    }

    /// Whether the marker is shown
    #[must_use]
    pub fn marker_enabled(&self) -> bool {
        self.marker
            .and_then(|marker| {
                self.world
                    .get::<&TeleportMarker>(marker)
                    .ok()
                    .map(|m| m.is_enabled())
            })
            .unwrap_or(false)
    }

    /// Whether the marker animation is advancing
    #[must_use]
    pub fn marker_animating(&self) -> bool {
        self.marker
            .and_then(|marker| {
                self.world
                    .get::<&TeleportMarker>(marker)
                    .ok()
                    .map(|m| m.is_enabled() && m.animation().is_advancing())
            })
            .unwrap_or(false)
    }

    /// Advance the marker animation
    pub fn animate_marker(&mut self, dt: f32) {
        self.with_marker(|marker, _| {
            if marker.is_enabled() {
                marker.animation_mut().update(dt);
            }
        });
    }
}
