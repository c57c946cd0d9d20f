//! Host collaborators
//!
//! Everything the locomotion component needs from the surrounding
//! application is expressed here as a trait. The component receives these
//! through [`LocomotionBuilder`](crate::locomotion::LocomotionBuilder) and never
//! reaches for global state.
//!
//! The crate ships reference implementations that run headless:
//!
//! - [`HeadlessDisplay`] for [`ImmersiveDisplay`]
//! - [`ScreenFade`](crate::transition::ScreenFade) for [`FadeService`]
//! - [`RayPointers`](crate::physics::RayPointers) for [`FocusResolver`]
//! - [`Physics`](crate::physics::Physics) for [`SpatialQuery`]
//! - [`Input`](crate::input::Input) for [`AxisSampler`]

use glam::Vec3;

use crate::input::SourceId;
use crate::transition::{Continuation, FadeSignals, TransitionToken};

// ============================================================================
// Display
// ============================================================================

/// Presence check for immersive display hardware.
pub trait ImmersiveDisplay {
    /// Whether a head-mounted display is connected and usable.
    fn is_present(&self) -> bool;
}

/// Display stand-in for headless runs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlessDisplay {
    /// Reported presence
    pub present: bool,
}

impl HeadlessDisplay {
    /// A display that reports itself as connected.
    #[must_use]
    pub const fn connected() -> Self {
        Self { present: true }
    }

    /// A display that reports itself as missing.
    #[must_use]
    pub const fn disconnected() -> Self {
        Self { present: false }
    }
}

impl ImmersiveDisplay for HeadlessDisplay {
    fn is_present(&self) -> bool {
        self.present
    }
}

// ============================================================================
// Fade
// ============================================================================

/// Two-phase fade sequencer.
///
/// `M` is the payload carried by each phase of a [`Continuation`]. The
/// service never inspects it; it hands the payload back through
/// [`FadeService::update`] when the matching phase boundary is reached.
pub trait FadeService<M> {
    /// Whether a transition is in flight.
    fn is_busy(&self) -> bool;

    /// Current overlay opacity, 0.0 (clear) to 1.0 (fully faded out).
    fn opacity(&self) -> f32;

    /// Start a transition.
    ///
    /// Returns `None` and drops the request when another transition is in
    /// flight.
    fn fade(
        &mut self,
        out_duration: f32,
        in_duration: f32,
        continuation: Continuation<M>,
    ) -> Option<TransitionToken>;

    /// Advance the transition clock and collect the phase boundaries crossed.
    fn update(&mut self, dt: f32) -> FadeSignals<M>;
}

// ============================================================================
// Focus
// ============================================================================

/// Opaque reference to a pointing source owned by the focus resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerHandle(pub u32);

/// Identifier of the scene object a query hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitObject(pub u64);

/// What a pointing source is currently focused on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusDetails {
    /// World-space hit point
    pub point: Vec3,
    /// Surface normal at the hit point
    pub normal: Vec3,
    /// Object that was hit
    pub object: HitObject,
}

/// Resolves pointing sources (controller rays, gaze) to world focus.
pub trait FocusResolver {
    /// The only active pointer, if exactly one exists.
    fn try_get_single_pointer(&self) -> Option<PointerHandle>;

    /// The pointer driven by the given input source.
    fn try_get_pointer_for_event(&self, source: SourceId) -> Option<PointerHandle>;

    /// Current focus of a pointer. `None` when it points at nothing.
    fn focus_details(&self, pointer: PointerHandle) -> Option<FocusDetails>;
}

// ============================================================================
// Spatial queries
// ============================================================================

/// Result of a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The object that was hit
    pub object: HitObject,
    /// The point of intersection
    pub point: Vec3,
    /// Surface normal at the intersection
    pub normal: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

/// Raycasts against the host's collision world.
pub trait SpatialQuery {
    /// Cast a ray and return the first hit within `max_distance`.
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit>;
}

// ============================================================================
// Axes
// ============================================================================

/// Samples named analog axes, roughly in [-1, 1].
///
/// Unknown axis names read as 0.0.
pub trait AxisSampler {
    /// Current value of the named axis
    fn axis_value(&self, name: &str) -> f32;
}
