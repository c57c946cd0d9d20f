//! Thumbstick locomotion for VR rigs
//!
//! This crate provides:
//! - Teleport aiming with a surface-validated target marker
//! - Snap rotation and strafing from gamepad or controller sticks
//! - A fade transition service that hides every rig change
//! - Reference host services built on hecs and rapier3d

pub mod core;
pub mod ecs;
pub mod host;
pub mod input;
pub mod locomotion;
pub mod physics;
pub mod transition;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::core::{LocomotionConfig, LocomotionError, LocomotionEvent, TrackingSpace};
    pub use crate::ecs::Transform;
    pub use crate::host::{
        AxisSampler, FadeService, FocusResolver, HeadlessDisplay, ImmersiveDisplay, SpatialQuery,
    };
    pub use crate::input::{Input, InputEvent, PressKind, SourceId};
    pub use crate::locomotion::{Locomotion, LocomotionBuilder, Rig, RigMutation};
    pub use crate::physics::{Physics, RayPointers};
    pub use crate::transition::{ScreenFade, TransitionToken};
    pub use glam::{Quat, Vec2, Vec3};
}
