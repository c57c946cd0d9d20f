//! Input handling module
//!
//! Provides raw axis state, the input event variant, and the classifier that
//! maps both to locomotion actions.

mod classifier;
mod event;
mod state;

pub use classifier::{Action, Gates, RotationDirection, StrafeDirection, classify};
pub use event::{AimOrigin, InputEvent, PressKind, SourceId};
pub use state::Input;
