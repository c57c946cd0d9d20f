//! Static collision world using rapier3d

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::host::{HitObject, RaycastHit, SpatialQuery};

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

impl From<ColliderHandle> for HitObject {
    fn from(handle: ColliderHandle) -> Self {
        let (index, generation) = handle.0.into_raw_parts();
        HitObject((u64::from(generation) << 32) | u64::from(index))
    }
}

/// Convert glam Quat to rapier3d UnitQuaternion
fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Collision world the locomotion queries run against.
///
/// Bodies are fixed; nothing is simulated. Call [`Physics::refresh_queries`]
/// after adding colliders so raycasts see them.
pub struct Physics {
    /// Rigid body set
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Query pipeline for raycasting
    query_pipeline: QueryPipeline,
}

impl Physics {
    /// Create an empty collision world
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Create a static rigid body (doesn't move)
    pub fn create_static_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let isometry = Isometry::from_parts(
            Translation3::new(position.x, position.y, position.z),
            quat_to_rapier(rotation),
        );
        let body = RigidBodyBuilder::fixed().position(isometry).build();

        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Add a box collider to a rigid body
    pub fn add_box_collider(&mut self, body: RigidBodyHandle, half_extents: Vec3) -> ColliderHandle {
        let collider =
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build();

        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Add a ground plane collider whose top surface sits 0.1 above the body
    pub fn add_ground_plane(&mut self, body: RigidBodyHandle) -> ColliderHandle {
        self.add_box_collider(body, Vec3::new(100.0, 0.1, 100.0))
    }

    /// Number of colliders in the world
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    /// Rebuild the acceleration structure used by raycasts
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Cast a ray and return the first hit with its surface normal
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                QueryFilter::default(),
            )
            .map(|(handle, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                let normal = intersection.normal;
                RaycastHit {
                    object: ColliderHandle(handle).into(),
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(normal.x, normal.y, normal.z),
                    distance: intersection.time_of_impact,
                }
            })
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

impl SpatialQuery for Physics {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        Physics::raycast(self, origin, direction, max_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> Physics {
        let mut physics = Physics::new();
        let body = physics.create_static_body(Vec3::ZERO, Quat::IDENTITY);
        physics.add_ground_plane(body);
        physics.refresh_queries();
        physics
    }

    #[test]
    fn test_raycast_down_hits_ground_top() {
        let physics = ground();

        let hit = physics
            .raycast(Vec3::new(1.0, 2.0, -3.0), Vec3::NEG_Y, 5.0)
            .unwrap();

        assert!((hit.distance - 1.9).abs() < 0.001);
        assert!((hit.point - Vec3::new(1.0, 0.1, -3.0)).length() < 0.001);
        assert!(hit.normal.dot(Vec3::Y) > 0.999);
    }

    #[test]
    fn test_raycast_respects_max_distance() {
        let physics = ground();
        assert!(physics.raycast(Vec3::new(0.0, 10.0, 0.0), Vec3::NEG_Y, 5.0).is_none());
        assert!(physics.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, 5.0).is_none());
    }

    #[test]
    fn test_tilted_surface_normal() {
        let mut physics = Physics::new();
        let body = physics.create_static_body(
            Vec3::new(0.0, 0.0, -5.0),
            Quat::from_rotation_x(std::f32::consts::FRAC_PI_4),
        );
        physics.add_box_collider(body, Vec3::new(2.0, 0.1, 2.0));
        physics.refresh_queries();

        let hit = physics
            .raycast(Vec3::new(0.0, 3.0, -5.0), Vec3::NEG_Y, 10.0)
            .unwrap();

        let alignment = hit.normal.dot(Vec3::Y);
        assert!((alignment - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.01);
    }
}
