//! Locomotion event queue
//!
//! The controller reports what it did as [`LocomotionEvent`]s so hosts can
//! drive audio, haptics or telemetry without reaching into its state.
//!
//! # Double buffering
//!
//! Events pushed during frame N become readable after the next `swap()`.
//! The host swaps once per frame, before reading.
//!
//! ```ignore
//! locomotion.update(&input, dt);
//! locomotion.events_mut().swap();
//! for event in locomotion.events().iter() {
//!     if let LocomotionEvent::Teleported { .. } = event {
//!         play_whoosh();
//!     }
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;

use crate::input::AimOrigin;
use crate::locomotion::TransitionKind;
use crate::transition::TransitionToken;

// ============================================================================
// Event Types
// ============================================================================

/// Something the locomotion controller did
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum LocomotionEvent {
    // -------------------------------------------------------------------------
    // Teleport aim
    // -------------------------------------------------------------------------
    /// A pointer was bound and the marker shown
    AimStarted {
        /// Who started the aim
        origin: AimOrigin,
    },

    /// The target switched between valid and invalid
    TargetValidityChanged {
        /// New validity
        valid: bool,
        /// Last valid target position
        position: Vec3,
    },

    /// The aim ended without a valid target
    AimCancelled,

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------
    /// A fade transition was accepted
    TransitionStarted {
        token: TransitionToken,
        kind: TransitionKind,
    },

    /// A transition request was dropped because another is in flight
    TransitionRejected { kind: TransitionKind },

    /// Full opacity reached; the rig change has been applied
    FadedOut { token: TransitionToken },

    /// The transition finished
    FadedIn { token: TransitionToken },

    // -------------------------------------------------------------------------
    // Rig changes
    // -------------------------------------------------------------------------
    /// The stage moved for a teleport
    Teleported {
        token: TransitionToken,
        /// Camera target of the teleport
        target: Vec3,
    },

    /// The stage turned
    Rotated {
        token: TransitionToken,
        /// Signed turn, right positive
        degrees: f32,
    },

    /// The stage stepped
    Strafed {
        token: TransitionToken,
        /// Offset in the levelled camera frame
        offset: Vec3,
    },
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for frame-consistent event processing.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<LocomotionEvent>,
    /// Events from previous frame, ready for processing
    processing: VecDeque<LocomotionEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 16;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
            processing: VecDeque::with_capacity(Self::DEFAULT_CAPACITY),
        }
    }

    /// Push an event to be processed after the next swap.
    #[inline]
    pub fn push(&mut self, event: LocomotionEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events made readable by the last swap.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &LocomotionEvent> {
        self.processing.iter()
    }

    /// Drain the readable events.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = LocomotionEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any readable events.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of readable events.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Get the number of events waiting for the next swap.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and processing).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
