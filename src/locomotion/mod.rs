//! Thumbstick locomotion
//!
//! Teleport, snap-turn and strafe for a tracked VR rig. Every rig change is
//! hidden behind a fade so the user never sees the world jump.

mod controller;
mod marker;
mod mutation;
mod rig;
mod teleport;

pub use controller::{Locomotion, LocomotionBuilder};
pub use marker::{MarkerAnimation, PlaybackState, TeleportMarker};
pub use mutation::{RigMutation, TransitionKind};
pub use rig::Rig;
pub use teleport::{LocomotionState, TeleportOutcome, TeleportPhase, TeleportTargeting};
