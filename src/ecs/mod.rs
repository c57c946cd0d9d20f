//! Entity Component System module
//!
//! The locomotion rig lives in a hecs world: a stage root, the tracked head
//! parented to it, and the teleport marker.

mod components;
mod hierarchy;

pub use components::{Head, Stage, Transform, level_rotation};
pub use hierarchy::{GlobalTransform, Parent, global_transform};
