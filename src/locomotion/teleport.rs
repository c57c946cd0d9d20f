//! Teleport targeting
//!
//! `Idle → Aiming → (Valid | Invalid) → Committed | Cancelled → Idle`
//!
//! Aiming binds one pointer and the origin that started the aim. Each tick
//! asks the focus resolver where that pointer lands; a hit on a surface facing
//! up (strictly above the alignment threshold) is a valid target and moves
//! the marker there. Finishing the aim always unbinds the pointer and hides
//! the marker, whatever the outcome.

use glam::Vec3;

use crate::host::{FocusResolver, PointerHandle};
use crate::input::{AimOrigin, SourceId};

use super::rig::Rig;

/// Targeting phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeleportPhase {
    /// No aim active
    #[default]
    Idle,
    /// Aim bound, not yet evaluated
    Aiming,
    /// Pointer rests on a valid surface
    Valid,
    /// Pointer hits nothing usable
    Invalid,
}

/// How an aim ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeleportOutcome {
    /// Released on a valid target at `marker_position`
    Committed { marker_position: Vec3 },
    /// Released without a valid target
    Cancelled,
}

/// Snapshot of the locomotion state for hosts and tests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocomotionState {
    pub pointing_source_active: bool,
    pub active_source_id: Option<SourceId>,
    pub teleport_target_valid: bool,
    pub teleport_target_position: Vec3,
}

/// Teleport aim state machine
#[derive(Debug, Default)]
pub struct TeleportTargeting {
    pointer: Option<PointerHandle>,
    origin: Option<AimOrigin>,
    phase: TeleportPhase,
    target_position: Vec3,
}

impl TeleportTargeting {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> TeleportPhase {
        self.phase
    }

    #[must_use]
    pub const fn is_aiming(&self) -> bool {
        self.pointer.is_some()
    }

    #[must_use]
    pub const fn origin(&self) -> Option<AimOrigin> {
        self.origin
    }

    #[must_use]
    pub const fn pointer(&self) -> Option<PointerHandle> {
        self.pointer
    }

    #[must_use]
    pub fn target_valid(&self) -> bool {
        self.phase == TeleportPhase::Valid
    }

    #[must_use]
    pub fn state(&self) -> LocomotionState {
        LocomotionState {
            pointing_source_active: self.pointer.is_some(),
            active_source_id: self.origin.and_then(AimOrigin::source_id),
            teleport_target_valid: self.target_valid(),
            teleport_target_position: self.target_position,
        }
    }

    /// Bind a pointer and show the marker.
    ///
    /// Returns `false` and changes nothing if an aim is already active.
    pub fn begin(&mut self, pointer: PointerHandle, origin: AimOrigin, rig: &mut Rig) -> bool {
        if self.pointer.is_some() {
            return false;
        }

        self.pointer = Some(pointer);
        self.origin = Some(origin);
        self.phase = TeleportPhase::Aiming;
        rig.with_marker(|marker, _| marker.enable());

        log::debug!("teleport aim bound to {pointer:?} ({origin:?})");
        true
    }

    /// Re-evaluate the target. Returns the new phase.
    pub fn tick(&mut self, focus: &dyn FocusResolver, alignment: f32, rig: &mut Rig) -> TeleportPhase {
        let Some(pointer) = self.pointer else {
            return self.phase;
        };

        let hit = focus
            .focus_details(pointer)
            .filter(|details| details.normal.dot(Vec3::Y) > alignment);

        match hit {
            Some(details) => {
                self.phase = TeleportPhase::Valid;
                self.target_position = details.point;
                rig.with_marker(|marker, transform| {
                    transform.position = details.point;
                    let animation = marker.animation_mut();
                    animation.set_speed(1.0);
                    animation.play();
                });
            }
            None => {
                self.phase = TeleportPhase::Invalid;
                rig.with_marker(|marker, _| marker.animation_mut().set_speed(0.0));
            }
        }

        self.phase
    }

    /// End the aim, valid or not.
    ///
    /// Returns `None` when no aim was active.
    pub fn finish(&mut self, rig: &mut Rig) -> Option<TeleportOutcome> {
        self.pointer.take()?;
        self.origin = None;

        let outcome = if self.phase == TeleportPhase::Valid {
            TeleportOutcome::Committed {
                marker_position: rig.marker_position().unwrap_or(self.target_position),
            }
        } else {
            TeleportOutcome::Cancelled
        };

        rig.with_marker(|marker, _| marker.disable());
        self.phase = TeleportPhase::Idle;
        self.target_position = Vec3::ZERO;
        Some(outcome)
    }

    /// Per-frame reset while nothing is being aimed.
    pub fn reset_if_idle(&mut self) {
        if self.pointer.is_none() {
            self.phase = TeleportPhase::Idle;
            self.target_position = Vec3::ZERO;
        }
    }
}
