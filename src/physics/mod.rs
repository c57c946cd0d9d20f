//! Physics queries module
//!
//! Built on top of rapier3d

mod focus;
mod world;

pub use focus::{PointerRay, RayPointers};
pub use world::{ColliderHandle, Physics, RigidBodyHandle};
