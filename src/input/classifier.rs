//! Stick classification
//!
//! Turns one [`InputEvent`] into at most one locomotion [`Action`]. The
//! classifier is a pure function of the event, the current gates and the
//! thresholds; it never queues anything. An action that is gated off is
//! simply `Action::None` for that event.
//!
//! # Priority
//!
//! Teleport (start or confirm) wins over strafe, strafe over rotate. Strafe
//! and rotate are never produced while a teleport aim is active.
//!
//! # Example
//!
//! ```ignore
//! let gates = Gates { aim: None, busy: false, features: config.features };
//! let event = InputEvent::Axis { movement: Vec2::new(0.0, 0.9), rotation: Vec2::ZERO };
//! assert_eq!(classify(&event, &gates, &config.thresholds), Action::StartTeleportAim);
//! ```

use glam::{Vec2, Vec3};

use crate::core::{FeatureToggles, Thresholds};

use super::event::{AimOrigin, InputEvent, PressKind};

// ============================================================================
// Actions
// ============================================================================

/// Direction of a strafe step, relative to the levelled camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrafeDirection {
    Left,
    Right,
    Back,
}

impl StrafeDirection {
    /// Unit offset in camera space (-Z is forward)
    #[must_use]
    pub const fn unit(self) -> Vec3 {
        match self {
            Self::Left => Vec3::NEG_X,
            Self::Right => Vec3::X,
            Self::Back => Vec3::Z,
        }
    }
}

/// Direction of a snap turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Left,
    Right,
}

impl RotationDirection {
    /// Sign applied to the configured rotation step (right is positive)
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// What the user asked for with one input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    /// Nothing to do
    #[default]
    None,
    /// Begin aiming a teleport
    StartTeleportAim,
    /// Release the active teleport aim
    ConfirmTeleport,
    /// Step sideways or back
    Strafe(StrafeDirection),
    /// Snap turn
    Rotate(RotationDirection),
}

// ============================================================================
// Gates
// ============================================================================

/// Runtime state the classifier needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gates {
    /// Origin of the active teleport aim, if any
    pub aim: Option<AimOrigin>,
    /// Whether a fade transition is in flight
    pub busy: bool,
    /// Enabled actions
    pub features: FeatureToggles,
}

// ============================================================================
// Classification
// ============================================================================

fn pushed_forward(v: Vec2, t: &Thresholds) -> bool {
    v.y > t.activation && v.x.abs() < t.orthogonal_limit
}

fn pushed_back(v: Vec2, t: &Thresholds) -> bool {
    v.y < -t.activation && v.x.abs() < t.orthogonal_limit
}

fn pushed_left(v: Vec2, t: &Thresholds) -> bool {
    v.x < -t.activation && v.y.abs() < t.orthogonal_limit
}

fn pushed_right(v: Vec2, t: &Thresholds) -> bool {
    v.x > t.activation && v.y.abs() < t.orthogonal_limit
}

fn released(v: Vec2, t: &Thresholds) -> bool {
    v.length() < t.release
}

fn turn(v: Vec2, t: &Thresholds) -> Option<RotationDirection> {
    if pushed_left(v, t) {
        Some(RotationDirection::Left)
    } else if pushed_right(v, t) {
        Some(RotationDirection::Right)
    } else {
        None
    }
}

/// Classify one input event.
#[must_use]
pub fn classify(event: &InputEvent, gates: &Gates, thresholds: &Thresholds) -> Action {
    if gates.busy {
        return Action::None;
    }

    match *event {
        InputEvent::Axis { movement, rotation } => {
            if gates.features.teleport {
                match gates.aim {
                    None if pushed_forward(movement, thresholds) => {
                        return Action::StartTeleportAim;
                    }
                    Some(AimOrigin::Gamepad) if released(movement, thresholds) => {
                        return Action::ConfirmTeleport;
                    }
                    _ => {}
                }
            }

            if gates.aim.is_some() {
                return Action::None;
            }

            if gates.features.strafe {
                if pushed_left(movement, thresholds) {
                    return Action::Strafe(StrafeDirection::Left);
                }
                if pushed_right(movement, thresholds) {
                    return Action::Strafe(StrafeDirection::Right);
                }
                if pushed_back(movement, thresholds) {
                    return Action::Strafe(StrafeDirection::Back);
                }
            }

            if gates.features.rotation
                && let Some(direction) = turn(rotation, thresholds)
            {
                return Action::Rotate(direction);
            }

            Action::None
        }

        InputEvent::PositionChanged {
            press,
            position,
            source,
        } => {
            if gates.features.teleport {
                match gates.aim {
                    None if press == PressKind::Thumbstick
                        && pushed_forward(position, thresholds) =>
                    {
                        return Action::StartTeleportAim;
                    }
                    Some(AimOrigin::Source(active))
                        if active == source && released(position, thresholds) =>
                    {
                        return Action::ConfirmTeleport;
                    }
                    _ => {}
                }
            }

            if gates.aim.is_some() {
                return Action::None;
            }

            if gates.features.strafe && pushed_back(position, thresholds) {
                return Action::Strafe(StrafeDirection::Back);
            }

            if gates.features.rotation
                && let Some(direction) = turn(position, thresholds)
            {
                return Action::Rotate(direction);
            }

            Action::None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
