//! Controller-ray focus resolution

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::host::{FocusDetails, FocusResolver, PointerHandle};
use crate::input::SourceId;

use super::world::Physics;

/// World-space ray of one pointing source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl PointerRay {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }
}

/// Focus resolver backed by per-source rays cast into a [`Physics`] world.
///
/// The host refreshes each controller's ray every frame through
/// [`RayPointers::set_pointer`]; pointer handles are the source ids.
pub struct RayPointers {
    physics: Rc<Physics>,
    rays: RefCell<FxHashMap<SourceId, PointerRay>>,
    max_distance: f32,
}

impl RayPointers {
    /// Default pointer reach in metres
    pub const DEFAULT_RANGE: f32 = 20.0;

    /// Create a resolver with no pointers
    #[must_use]
    pub fn new(physics: Rc<Physics>) -> Self {
        Self::with_range(physics, Self::DEFAULT_RANGE)
    }

    /// Create a resolver whose rays reach `max_distance`
    #[must_use]
    pub fn with_range(physics: Rc<Physics>, max_distance: f32) -> Self {
        Self {
            physics,
            rays: RefCell::new(FxHashMap::default()),
            max_distance,
        }
    }

    /// Add or move the ray of a source
    pub fn set_pointer(&self, source: SourceId, ray: PointerRay) {
        self.rays.borrow_mut().insert(source, ray);
    }

    /// Forget a source (controller lost tracking)
    pub fn remove_pointer(&self, source: SourceId) -> bool {
        self.rays.borrow_mut().remove(&source).is_some()
    }
}

impl FocusResolver for RayPointers {
    fn try_get_single_pointer(&self) -> Option<PointerHandle> {
        let rays = self.rays.borrow();
        if rays.len() != 1 {
            return None;
        }
        rays.keys().next().map(|source| PointerHandle(source.0))
    }

    fn try_get_pointer_for_event(&self, source: SourceId) -> Option<PointerHandle> {
        self.rays
            .borrow()
            .contains_key(&source)
            .then_some(PointerHandle(source.0))
    }

    fn focus_details(&self, pointer: PointerHandle) -> Option<FocusDetails> {
        let ray = *self.rays.borrow().get(&SourceId(pointer.0))?;
        let hit = self
            .physics
            .raycast(ray.origin, ray.direction, self.max_distance)?;

        Some(FocusDetails {
            point: hit.point,
            normal: hit.normal,
            object: hit.object,
        })
    }
}
