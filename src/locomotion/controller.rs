//! Locomotion controller
//!
//! Ties the classifier, teleport targeting and the fade service together.
//! A host builds one controller per user with [`LocomotionBuilder`], then
//! each frame:
//!
//! 1. updates the head pose through [`Locomotion::rig_mut`]
//! 2. forwards motion-controller events to [`Locomotion::handle_event`], or
//!    drains those buffered in [`Input`] with [`Locomotion::handle_pending`]
//! 3. calls [`Locomotion::update`] with its axis sampler and the frame time
//!
//! Rig changes only ever happen inside a fade, at full opacity.

use std::rc::Rc;

use glam::{Vec2, Vec3};

use crate::core::{
    EventQueue, FadeTiming, LocomotionConfig, LocomotionError, LocomotionEvent, TrackingSpace,
};
use crate::host::{AxisSampler, FadeService, FocusResolver, ImmersiveDisplay, SpatialQuery};
use crate::input::{Action, AimOrigin, Gates, Input, InputEvent, classify};
use crate::transition::{Continuation, FadeSignal, TransitionToken};

use super::mutation::RigMutation;
use super::rig::Rig;
use super::teleport::{LocomotionState, TeleportOutcome, TeleportPhase, TeleportTargeting};

// ============================================================================
// Builder
// ============================================================================

/// Collects the collaborators a [`Locomotion`] needs.
pub struct LocomotionBuilder {
    config: LocomotionConfig,
    rig: Rig,
    display: Option<Box<dyn ImmersiveDisplay>>,
    fade: Option<Box<dyn FadeService<RigMutation>>>,
    focus: Option<Rc<dyn FocusResolver>>,
    spatial: Option<Rc<dyn SpatialQuery>>,
}

impl LocomotionBuilder {
    /// Start a builder for the given rig
    #[must_use]
    pub fn new(config: LocomotionConfig, rig: Rig) -> Self {
        Self {
            config,
            rig,
            display: None,
            fade: None,
            focus: None,
            spatial: None,
        }
    }

    /// Set the immersive display check
    #[must_use]
    pub fn with_display(mut self, display: impl ImmersiveDisplay + 'static) -> Self {
        self.display = Some(Box::new(display));
        self
    }

    /// Set the fade service
    #[must_use]
    pub fn with_fade(mut self, fade: impl FadeService<RigMutation> + 'static) -> Self {
        self.fade = Some(Box::new(fade));
        self
    }

    /// Set the focus resolver
    #[must_use]
    pub fn with_focus(mut self, focus: Rc<dyn FocusResolver>) -> Self {
        self.focus = Some(focus);
        self
    }

    /// Set the spatial query service used by the ground probe
    #[must_use]
    pub fn with_spatial(mut self, spatial: Rc<dyn SpatialQuery>) -> Self {
        self.spatial = Some(spatial);
        self
    }

    /// Build the controller.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, a collaborator is missing, or
    /// no immersive display is present. The component does not run in any of
    /// these cases.
    pub fn build(self) -> Result<Locomotion, LocomotionError> {
        let result = self.try_build();
        if let Err(error) = &result {
            log::error!("locomotion disabled: {error}");
        }
        result
    }

    fn try_build(self) -> Result<Locomotion, LocomotionError> {
        self.config.validate()?;

        let display = self
            .display
            .ok_or(LocomotionError::MissingCollaborator("immersive display"))?;
        let fade = self
            .fade
            .ok_or(LocomotionError::MissingCollaborator("fade service"))?;
        let focus = self
            .focus
            .ok_or(LocomotionError::MissingCollaborator("focus resolver"))?;
        let spatial = self
            .spatial
            .ok_or(LocomotionError::MissingCollaborator("spatial query"))?;

        if !display.is_present() {
            return Err(LocomotionError::DisplayUnavailable);
        }

        let mut rig = self.rig;
        rig.spawn_marker(&self.config.marker);

        log::info!(
            "locomotion ready (teleport: {}, strafe: {}, rotation: {}, {:?} tracking)",
            self.config.features.teleport,
            self.config.features.strafe,
            self.config.features.rotation,
            self.config.tracking_space,
        );

        Ok(Locomotion {
            input_enabled: self.config.input_enabled,
            config: self.config,
            rig,
            fade,
            focus,
            spatial,
            teleport: TeleportTargeting::new(),
            events: EventQueue::new(),
        })
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Thumbstick locomotion for one user
pub struct Locomotion {
    config: LocomotionConfig,
    rig: Rig,
    fade: Box<dyn FadeService<RigMutation>>,
    focus: Rc<dyn FocusResolver>,
    spatial: Rc<dyn SpatialQuery>,
    teleport: TeleportTargeting,
    events: EventQueue,
    input_enabled: bool,
}

impl Locomotion {
    /// Run one frame.
    ///
    /// Advances the fade (applying any rig change that reached full
    /// opacity), re-evaluates an active aim, then samples and classifies the
    /// gamepad sticks.
    pub fn update(&mut self, axes: &dyn AxisSampler, dt: f32) {
        self.advance_transitions(dt);

        self.teleport.reset_if_idle();
        if self.teleport.is_aiming() {
            self.refresh_target();
        }

        if self.input_enabled {
            let bindings = &self.config.axes;
            let event = InputEvent::Axis {
                movement: Vec2::new(
                    axes.axis_value(&bindings.movement_x),
                    axes.axis_value(&bindings.movement_y),
                ),
                rotation: Vec2::new(
                    axes.axis_value(&bindings.rotation_x),
                    axes.axis_value(&bindings.rotation_y),
                ),
            };
            self.dispatch(&event);
        }

        self.rig.animate_marker(dt);
    }

    /// Handle a discrete input event (typically a controller thumbstick).
    pub fn handle_event(&mut self, event: &InputEvent) {
        if self.input_enabled {
            self.dispatch(event);
        }
    }

    /// Dispatch every positional event buffered in `input`, in arrival order.
    ///
    /// The buffer is emptied even while input is disabled.
    pub fn handle_pending(&mut self, input: &mut Input) {
        for event in input.drain_events() {
            self.handle_event(&event);
        }
    }

    fn dispatch(&mut self, event: &InputEvent) {
        let gates = Gates {
            aim: self.teleport.origin(),
            busy: self.fade.is_busy(),
            features: self.config.features,
        };

        let action = classify(event, &gates, &self.config.thresholds);
        if action != Action::None {
            log::debug!("classified {action:?}");
        }

        match action {
            Action::None => {}
            Action::StartTeleportAim => self.start_aim(event),
            Action::ConfirmTeleport => self.finish_aim(),
            Action::Strafe(direction) => {
                self.request_strafe(direction.unit() * self.config.strafe_distance);
            }
            Action::Rotate(direction) => {
                self.request_rotation(direction.sign() * self.config.rotation_step);
            }
        }
    }

    // ------------------------------------------------------------------------
    // Teleport
    // ------------------------------------------------------------------------

    fn start_aim(&mut self, event: &InputEvent) {
        let (pointer, origin) = match *event {
            InputEvent::Axis { .. } => (self.focus.try_get_single_pointer(), AimOrigin::Gamepad),
            InputEvent::PositionChanged { source, .. } => (
                self.focus.try_get_pointer_for_event(source),
                AimOrigin::Source(source),
            ),
        };

        let Some(pointer) = pointer else {
            log::debug!("no pointer available for {origin:?}, aim dropped");
            return;
        };

        if self.teleport.begin(pointer, origin, &mut self.rig) {
            self.events.push(LocomotionEvent::AimStarted { origin });
            self.refresh_target();
        }
    }

    fn refresh_target(&mut self) {
        let was_valid = self.teleport.target_valid();
        let phase = self.teleport.tick(
            self.focus.as_ref(),
            self.config.thresholds.surface_alignment,
            &mut self.rig,
        );

        let valid = phase == TeleportPhase::Valid;
        if valid != was_valid {
            self.events.push(LocomotionEvent::TargetValidityChanged {
                valid,
                position: self.teleport.state().teleport_target_position,
            });
        }
    }

    fn finish_aim(&mut self) {
        match self.teleport.finish(&mut self.rig) {
            Some(TeleportOutcome::Committed { marker_position }) => {
                let target = self.ground_corrected(marker_position);
                log::debug!("teleport committed towards {target}");
                self.request(RigMutation::Teleport { target }, self.config.timings.teleport);
            }
            Some(TeleportOutcome::Cancelled) => {
                log::debug!("teleport cancelled: no valid target");
                self.events.push(LocomotionEvent::AimCancelled);
            }
            None => {}
        }
    }

    /// Camera target for a marker position: raised by the user's eye height.
    fn ground_corrected(&self, marker_position: Vec3) -> Vec3 {
        let eye_height = match self.config.tracking_space {
            TrackingSpace::Stationary => {
                let probe = self.config.ground_probe;
                self.spatial
                    .raycast(self.rig.camera().position(), Vec3::NEG_Y, probe.length)
                    .map_or(probe.fallback_height, |hit| hit.distance)
            }
            TrackingSpace::RoomScale => self.rig.head_pose().position.y,
        };

        marker_position + Vec3::Y * eye_height
    }

    // ------------------------------------------------------------------------
    // Rotation and strafe
    // ------------------------------------------------------------------------

    /// Snap-turn by `degrees` (right positive) behind a fade.
    ///
    /// Returns `None` for a zero turn or while another transition is in
    /// flight.
    pub fn request_rotation(&mut self, degrees: f32) -> Option<TransitionToken> {
        if degrees == 0.0 {
            return None;
        }
        self.request(RigMutation::Rotate { degrees }, self.config.timings.rotation)
    }

    /// Step by `offset` in the levelled camera frame behind a fade.
    ///
    /// Returns `None` for a zero offset or while another transition is in
    /// flight.
    pub fn request_strafe(&mut self, offset: Vec3) -> Option<TransitionToken> {
        if offset == Vec3::ZERO {
            return None;
        }
        self.request(RigMutation::Strafe { offset }, self.config.timings.strafe)
    }

    fn request(&mut self, mutation: RigMutation, timing: FadeTiming) -> Option<TransitionToken> {
        let kind = mutation.kind()?;

        if self.fade.is_busy() {
            log::warn!("{kind} dropped: transition in flight");
            self.events.push(LocomotionEvent::TransitionRejected { kind });
            return None;
        }

        let token = self.fade.fade(
            timing.fade_out,
            timing.fade_in,
            Continuation::on_out(mutation),
        );

        match token {
            Some(token) => {
                log::info!("{token}: {kind}");
                self.events
                    .push(LocomotionEvent::TransitionStarted { token, kind });
            }
            None => {
                self.events.push(LocomotionEvent::TransitionRejected { kind });
            }
        }
        token
    }

    fn advance_transitions(&mut self, dt: f32) {
        for signal in self.fade.update(dt) {
            match signal {
                FadeSignal::FadedOut { token, step } => {
                    step.apply(&mut self.rig);
                    self.events.push(LocomotionEvent::FadedOut { token });
                    if let Some(event) = Self::applied_event(token, step) {
                        self.events.push(event);
                    }
                    log::debug!("{token} applied {step:?}");
                }
                FadeSignal::FadedIn { token, step } => {
                    step.apply(&mut self.rig);
                    self.events.push(LocomotionEvent::FadedIn { token });
                }
            }
        }
    }

    fn applied_event(token: TransitionToken, step: RigMutation) -> Option<LocomotionEvent> {
        match step {
            RigMutation::None => None,
            RigMutation::Teleport { target } => Some(LocomotionEvent::Teleported { token, target }),
            RigMutation::Rotate { degrees } => Some(LocomotionEvent::Rotated { token, degrees }),
            RigMutation::Strafe { offset } => Some(LocomotionEvent::Strafed { token, offset }),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    #[must_use]
    pub fn rig(&self) -> &Rig {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut Rig {
        &mut self.rig
    }

    #[must_use]
    pub fn state(&self) -> LocomotionState {
        self.teleport.state()
    }

    #[must_use]
    pub fn teleport_phase(&self) -> TeleportPhase {
        self.teleport.phase()
    }

    #[must_use]
    pub fn is_transition_busy(&self) -> bool {
        self.fade.is_busy()
    }

    /// Current fade overlay opacity, for the host's renderer
    #[must_use]
    pub fn fade_opacity(&self) -> f32 {
        self.fade.opacity()
    }

    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.input_enabled
    }

    /// Suspend or resume input classification. Transitions in flight still
    /// complete.
    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventQueue {
        &mut self.events
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Transform;
    use crate::locomotion::TransitionKind;
    use crate::host::{FocusDetails, HeadlessDisplay, HitObject, PointerHandle, RaycastHit};
    use crate::input::{Input, PressKind, SourceId};
    use crate::transition::{FadeSignals, ScreenFade};
    use std::cell::{Cell, RefCell};

    // ------------------------------------------------------------------------
    // Test doubles
    // ------------------------------------------------------------------------

    #[derive(Default)]
    struct ScriptedFocus {
        pointers_available: Cell<bool>,
        details: Cell<Option<FocusDetails>>,
    }

    impl ScriptedFocus {
        fn floor_at(point: Vec3) -> Rc<Self> {
            let focus = Self::default();
            focus.pointers_available.set(true);
            focus.aim_at(point, Vec3::Y);
            Rc::new(focus)
        }

        fn aim_at(&self, point: Vec3, normal: Vec3) {
            self.details.set(Some(FocusDetails {
                point,
                normal,
                object: HitObject(7),
            }));
        }
    }

    impl FocusResolver for ScriptedFocus {
        fn try_get_single_pointer(&self) -> Option<PointerHandle> {
            self.pointers_available.get().then_some(PointerHandle(0))
        }

        fn try_get_pointer_for_event(&self, source: SourceId) -> Option<PointerHandle> {
            self.pointers_available
                .get()
                .then_some(PointerHandle(source.0))
        }

        fn focus_details(&self, _pointer: PointerHandle) -> Option<FocusDetails> {
            self.details.get()
        }
    }

    struct FloorProbe {
        distance: Option<f32>,
    }

    impl SpatialQuery for FloorProbe {
        fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
            let distance = self.distance.filter(|d| *d <= max_distance)?;
            Some(RaycastHit {
                object: HitObject(1),
                point: origin + direction * distance,
                normal: Vec3::Y,
                distance,
            })
        }
    }

    type FadeLog = Rc<RefCell<Vec<(f32, f32, Continuation<RigMutation>)>>>;

    /// Records every accepted request, delegates to a real fade
    struct RecordingFade {
        inner: ScreenFade<RigMutation>,
        accepted: FadeLog,
    }

    impl FadeService<RigMutation> for RecordingFade {
        fn is_busy(&self) -> bool {
            self.inner.is_busy()
        }

        fn opacity(&self) -> f32 {
            self.inner.opacity()
        }

        fn fade(
            &mut self,
            out_duration: f32,
            in_duration: f32,
            continuation: Continuation<RigMutation>,
        ) -> Option<TransitionToken> {
            let token = self.inner.fade(out_duration, in_duration, continuation)?;
            self.accepted
                .borrow_mut()
                .push((out_duration, in_duration, continuation));
            Some(token)
        }

        fn update(&mut self, dt: f32) -> FadeSignals<RigMutation> {
            self.inner.update(dt)
        }
    }

    struct Harness {
        locomotion: Locomotion,
        focus: Rc<ScriptedFocus>,
        fades: FadeLog,
        input: Input,
    }

    impl Harness {
        fn new(config: LocomotionConfig, focus: Rc<ScriptedFocus>, probe: Option<f32>) -> Self {
            let fades = FadeLog::default();
            let locomotion = LocomotionBuilder::new(config, Rig::standing(1.6))
                .with_display(HeadlessDisplay::connected())
                .with_fade(RecordingFade {
                    inner: ScreenFade::new(),
                    accepted: Rc::clone(&fades),
                })
                .with_focus(focus.clone())
                .with_spatial(Rc::new(FloorProbe { distance: probe }))
                .build()
                .unwrap();

            Self {
                locomotion,
                focus,
                fades,
                input: Input::new(),
            }
        }

        fn standard(focus: Rc<ScriptedFocus>) -> Self {
            Self::new(LocomotionConfig::default(), focus, Some(1.6))
        }

        fn frame(&mut self, movement: (f32, f32), rotation: (f32, f32), dt: f32) {
            self.input
                .set_stick("left_stick_x", "left_stick_y", Vec2::new(movement.0, movement.1));
            self.input
                .set_stick("right_stick_x", "right_stick_y", Vec2::new(rotation.0, rotation.1));
            self.locomotion.update(&self.input, dt);
        }

        fn idle_frame(&mut self, dt: f32) {
            self.frame((0.0, 0.0), (0.0, 0.0), dt);
        }

        fn fade_count(&self) -> usize {
            self.fades.borrow().len()
        }

        fn events(&mut self) -> Vec<LocomotionEvent> {
            self.locomotion.events_mut().swap();
            self.locomotion.events_mut().drain().collect()
        }
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    // ------------------------------------------------------------------------
    // Startup
    // ------------------------------------------------------------------------

    #[test]
    fn test_build_requires_collaborators() {
        let result = LocomotionBuilder::new(LocomotionConfig::default(), Rig::standing(1.6))
            .with_display(HeadlessDisplay::connected())
            .with_focus(ScriptedFocus::floor_at(Vec3::ZERO))
            .with_spatial(Rc::new(FloorProbe { distance: None }))
            .build();

        assert!(matches!(
            result,
            Err(LocomotionError::MissingCollaborator("fade service"))
        ));
    }

    #[test]
    fn test_build_requires_display() {
        let result = LocomotionBuilder::new(LocomotionConfig::default(), Rig::standing(1.6))
            .with_display(HeadlessDisplay::disconnected())
            .with_fade(ScreenFade::new())
            .with_focus(ScriptedFocus::floor_at(Vec3::ZERO))
            .with_spatial(Rc::new(FloorProbe { distance: None }))
            .build();

        assert!(matches!(result, Err(LocomotionError::DisplayUnavailable)));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = LocomotionConfig::default();
        config.thresholds.activation = 1.5;

        let result = LocomotionBuilder::new(config, Rig::standing(1.6))
            .with_display(HeadlessDisplay::connected())
            .with_fade(ScreenFade::new())
            .with_focus(ScriptedFocus::floor_at(Vec3::ZERO))
            .with_spatial(Rc::new(FloorProbe { distance: None }))
            .build();

        assert!(matches!(result, Err(LocomotionError::Config(_))));
    }

    #[test]
    fn test_build_spawns_hidden_marker() {
        let h = Harness::standard(ScriptedFocus::floor_at(Vec3::ZERO));

        assert!(h.locomotion.rig().marker_entity().is_some());
        assert!(!h.locomotion.rig().marker_enabled());
    }

    // ------------------------------------------------------------------------
    // Teleport
    // ------------------------------------------------------------------------

    #[test]
    fn test_teleport_end_to_end() {
        let target = Vec3::new(2.0, 0.0, -3.0);
        let mut h = Harness::standard(ScriptedFocus::floor_at(target));

        // Push forward: aim starts, marker lands on the hit point and plays
        h.frame((0.0, 0.85), (0.0, 0.0), 0.016);
        let state = h.locomotion.state();
        assert!(state.pointing_source_active);
        assert!(state.teleport_target_valid);
        assert_eq!(state.active_source_id, None);
        assert_eq!(h.locomotion.rig().marker_position(), Some(target));
        assert!(h.locomotion.rig().marker_animating());
        assert_eq!(h.fade_count(), 0);

        // Let go: committed, one transition towards the eye-height target
        h.frame((0.05, 0.05), (0.0, 0.0), 0.016);
        assert_eq!(h.fade_count(), 1);
        let (out, fade_in, continuation) = h.fades.borrow()[0];
        assert_eq!((out, fade_in), (0.25, 0.5));
        assert_eq!(
            continuation.on_out,
            RigMutation::Teleport {
                target: target + Vec3::Y * 1.6
            }
        );
        assert_eq!(continuation.on_in, RigMutation::None);
        assert!(!h.locomotion.state().pointing_source_active);
        assert!(!h.locomotion.rig().marker_enabled());

        // Nothing moves until full fade-out
        assert_eq!(h.locomotion.rig().stage_transform().position, Vec3::ZERO);
        h.idle_frame(0.25);
        assert!(approx(h.locomotion.rig().stage_transform().position, target));
        assert!(approx(
            h.locomotion.rig().camera().position(),
            target + Vec3::Y * 1.6
        ));

        h.idle_frame(0.5);
        assert!(!h.locomotion.is_transition_busy());
        assert_eq!(h.fade_count(), 1);

        let events = h.events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, LocomotionEvent::Teleported { .. }))
        );
    }

    #[test]
    fn test_teleport_probe_fallback_height() {
        let target = Vec3::new(1.0, 0.5, 1.0);
        let mut h = Harness::new(
            LocomotionConfig::default(),
            ScriptedFocus::floor_at(target),
            None,
        );

        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);
        h.idle_frame(0.016);

        let (_, _, continuation) = h.fades.borrow()[0];
        assert_eq!(
            continuation.on_out,
            RigMutation::Teleport {
                target: target + Vec3::Y * 2.6
            }
        );
    }

    #[test]
    fn test_room_scale_uses_tracked_height() {
        let target = Vec3::new(4.0, 0.0, 0.0);
        let config = LocomotionConfig {
            tracking_space: TrackingSpace::RoomScale,
            ..LocomotionConfig::default()
        };
        let mut h = Harness::new(config, ScriptedFocus::floor_at(target), Some(3.0));
        h.locomotion
            .rig_mut()
            .set_head_pose(Transform::from_position(Vec3::new(0.2, 1.7, 0.1)));

        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);
        h.idle_frame(0.016);
        h.idle_frame(0.25);

        // Stage lands on the floor point, head keeps its tracked offset
        let stage = h.locomotion.rig().stage_transform().position;
        assert!(approx(stage, Vec3::new(3.8, 0.0, -0.1)));
    }

    #[test]
    fn test_invalid_target_cancels_without_transition() {
        let focus = ScriptedFocus::floor_at(Vec3::ZERO);
        focus.aim_at(Vec3::new(0.0, 1.0, -2.0), Vec3::Z);
        let mut h = Harness::standard(focus);

        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);
        assert!(h.locomotion.state().pointing_source_active);
        assert!(!h.locomotion.state().teleport_target_valid);
        assert!(!h.locomotion.rig().marker_animating());

        h.idle_frame(0.016);
        assert_eq!(h.fade_count(), 0);
        assert!(!h.locomotion.state().pointing_source_active);
        assert!(!h.locomotion.rig().marker_enabled());
        assert!(h.events().contains(&LocomotionEvent::AimCancelled));
    }

    #[test]
    fn test_no_pointer_means_no_aim() {
        let focus = ScriptedFocus::floor_at(Vec3::ZERO);
        focus.pointers_available.set(false);
        let mut h = Harness::standard(focus);

        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);

        assert!(!h.locomotion.state().pointing_source_active);
        assert!(!h.locomotion.rig().marker_enabled());
    }

    #[test]
    fn test_controller_aim_confirms_only_from_its_source() {
        let target = Vec3::new(0.0, 0.0, -2.0);
        let mut h = Harness::standard(ScriptedFocus::floor_at(target));
        let stick = |x: f32, y: f32, source: u32| InputEvent::PositionChanged {
            press: PressKind::Thumbstick,
            position: Vec2::new(x, y),
            source: SourceId(source),
        };

        h.locomotion.handle_event(&stick(0.0, 0.9, 5));
        assert_eq!(h.locomotion.state().active_source_id, Some(SourceId(5)));

        // Second start from another controller is ignored
        h.locomotion.handle_event(&stick(0.0, 0.9, 6));
        assert_eq!(h.locomotion.state().active_source_id, Some(SourceId(5)));

        // Other controller and the resting gamepad cannot release it
        h.locomotion.handle_event(&stick(0.0, 0.0, 6));
        h.idle_frame(0.016);
        assert!(h.locomotion.state().pointing_source_active);

        h.locomotion.handle_event(&stick(0.0, 0.1, 5));
        assert!(!h.locomotion.state().pointing_source_active);
        assert_eq!(h.fade_count(), 1);
    }

    #[test]
    fn test_target_tracks_focus_while_aiming() {
        let mut h = Harness::standard(ScriptedFocus::floor_at(Vec3::new(1.0, 0.0, 0.0)));

        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);
        h.focus.aim_at(Vec3::new(3.0, 0.0, -1.0), Vec3::Y);
        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);

        assert_eq!(
            h.locomotion.rig().marker_position(),
            Some(Vec3::new(3.0, 0.0, -1.0))
        );
        assert_eq!(
            h.locomotion.state().teleport_target_position,
            Vec3::new(3.0, 0.0, -1.0)
        );
    }

    #[test]
    fn test_state_resets_after_commit_and_cancel() {
        let mut h = Harness::standard(ScriptedFocus::floor_at(Vec3::new(2.0, 0.0, -3.0)));
        let idle = LocomotionState {
            pointing_source_active: false,
            active_source_id: None,
            teleport_target_valid: false,
            teleport_target_position: Vec3::ZERO,
        };

        // Commit, then let the transition finish
        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);
        h.idle_frame(0.016);
        assert_eq!(h.fade_count(), 1);
        assert_eq!(h.locomotion.state(), idle);
        h.idle_frame(0.25);
        h.idle_frame(0.5);
        for _ in 0..10 {
            h.idle_frame(0.016);
        }
        assert_eq!(h.locomotion.state(), idle);

        // Valid target first, then drift onto a wall and cancel
        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);
        assert!(h.locomotion.state().teleport_target_valid);
        h.focus.aim_at(Vec3::new(0.0, 1.0, -4.0), Vec3::Z);
        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);
        h.idle_frame(0.016);
        assert_eq!(h.fade_count(), 1);
        assert_eq!(h.locomotion.state(), idle);
    }

    #[test]
    fn test_buffered_controller_events_drive_teleport() {
        let target = Vec3::new(0.0, 0.0, -2.0);
        let mut h = Harness::standard(ScriptedFocus::floor_at(target));

        h.input
            .process_position(PressKind::Thumbstick, Vec2::new(0.0, 0.9), SourceId(3));
        h.locomotion.handle_pending(&mut h.input);
        assert_eq!(h.input.pending_events(), 0);
        assert_eq!(h.locomotion.state().active_source_id, Some(SourceId(3)));

        h.idle_frame(0.016);
        assert!(h.locomotion.state().pointing_source_active);

        h.input
            .process_position(PressKind::Thumbstick, Vec2::new(0.0, 0.05), SourceId(3));
        h.locomotion.handle_pending(&mut h.input);
        assert!(!h.locomotion.state().pointing_source_active);
        assert_eq!(h.fade_count(), 1);
        assert_eq!(
            h.fades.borrow()[0].2.on_out,
            RigMutation::Teleport {
                target: target + Vec3::Y * 1.6
            }
        );
    }

    #[test]
    fn test_disabled_input_discards_buffered_events() {
        let mut h = Harness::standard(ScriptedFocus::floor_at(Vec3::ZERO));
        h.locomotion.set_input_enabled(false);

        h.input
            .process_position(PressKind::Thumbstick, Vec2::new(0.0, 0.9), SourceId(1));
        h.locomotion.handle_pending(&mut h.input);
        assert_eq!(h.input.pending_events(), 0);

        h.locomotion.set_input_enabled(true);
        h.locomotion.handle_pending(&mut h.input);
        assert!(!h.locomotion.state().pointing_source_active);
    }

    // ------------------------------------------------------------------------
    // Rotation and strafe
    // ------------------------------------------------------------------------

    #[test]
    fn test_zero_magnitude_never_fades() {
        let mut h = Harness::standard(ScriptedFocus::floor_at(Vec3::ZERO));

        assert!(h.locomotion.request_rotation(0.0).is_none());
        assert!(h.locomotion.request_strafe(Vec3::ZERO).is_none());

        let mut config = LocomotionConfig::default();
        config.rotation_step = 0.0;
        config.strafe_distance = 0.0;
        let mut h2 = Harness::new(config, ScriptedFocus::floor_at(Vec3::ZERO), Some(1.6));
        h2.frame((0.0, 0.0), (0.9, 0.0), 0.016);
        h2.frame((-0.9, 0.0), (0.0, 0.0), 0.016);

        assert_eq!(h.fade_count(), 0);
        assert_eq!(h2.fade_count(), 0);
    }

    #[test]
    fn test_rotate_stick_turns_about_camera() {
        let mut h = Harness::standard(ScriptedFocus::floor_at(Vec3::ZERO));
        h.locomotion
            .rig_mut()
            .set_head_pose(Transform::from_position(Vec3::new(0.5, 1.6, 0.0)));
        let camera_before = h.locomotion.rig().camera().position();

        h.frame((0.0, 0.0), (0.9, 0.0), 0.016);
        assert_eq!(h.fade_count(), 1);
        assert_eq!(
            h.fades.borrow()[0].2.on_out,
            RigMutation::Rotate { degrees: 45.0 }
        );

        h.idle_frame(0.25);
        assert!(approx(h.locomotion.rig().camera().position(), camera_before));
        let forward = h.locomotion.rig().camera().rotation() * Vec3::NEG_Z;
        assert!(forward.x > 0.7 && forward.z < -0.7);
    }

    #[test]
    fn test_strafe_stick_steps_sideways() {
        let mut h = Harness::standard(ScriptedFocus::floor_at(Vec3::ZERO));

        h.frame((-0.95, 0.1), (0.0, 0.0), 0.016);
        assert_eq!(
            h.fades.borrow()[0].2.on_out,
            RigMutation::Strafe {
                offset: Vec3::new(-0.5, 0.0, 0.0)
            }
        );

        h.idle_frame(0.25);
        assert!(approx(
            h.locomotion.rig().stage_transform().position,
            Vec3::new(-0.5, 0.0, 0.0)
        ));
    }

    // ------------------------------------------------------------------------
    // Busy guard
    // ------------------------------------------------------------------------

    #[test]
    fn test_busy_rejects_every_action_until_faded_in() {
        let mut h = Harness::standard(ScriptedFocus::floor_at(Vec3::ZERO));

        let token = h.locomotion.request_rotation(45.0).unwrap();
        assert!(h.locomotion.is_transition_busy());

        // Rotate, strafe and teleport start are all dropped
        assert!(h.locomotion.request_rotation(45.0).is_none());
        assert!(h.locomotion.request_strafe(Vec3::X).is_none());
        h.frame((0.0, 0.9), (0.0, 0.0), 0.0);
        assert!(!h.locomotion.state().pointing_source_active);
        h.frame((-0.9, 0.0), (0.9, 0.0), 0.0);
        assert_eq!(h.fade_count(), 1);

        // Fade out, then fade in
        h.idle_frame(0.25);
        assert!(h.locomotion.is_transition_busy());
        h.idle_frame(0.25);
        assert!(!h.locomotion.is_transition_busy());

        let events = h.events();
        assert!(events.contains(&LocomotionEvent::TransitionRejected {
            kind: TransitionKind::Rotate
        }));
        assert!(events.contains(&LocomotionEvent::FadedIn { token }));

        let next = h.locomotion.request_strafe(Vec3::X).unwrap();
        assert!(next > token);
    }

    #[test]
    fn test_no_moves_while_aiming() {
        let mut h = Harness::standard(ScriptedFocus::floor_at(Vec3::ZERO));

        h.frame((0.0, 0.9), (0.0, 0.0), 0.016);
        h.frame((0.0, 0.9), (0.9, 0.0), 0.016);

        assert_eq!(h.fade_count(), 0);
        assert!(h.locomotion.state().pointing_source_active);
    }

    #[test]
    fn test_input_disabled_ignores_sticks() {
        let mut h = Harness::standard(ScriptedFocus::floor_at(Vec3::ZERO));
        h.locomotion.set_input_enabled(false);

        h.frame((0.0, 0.0), (0.9, 0.0), 0.016);
        h.locomotion.handle_event(&InputEvent::PositionChanged {
            press: PressKind::Thumbstick,
            position: Vec2::new(0.0, 0.9),
            source: SourceId(1),
        });

        assert_eq!(h.fade_count(), 0);
        assert!(!h.locomotion.state().pointing_source_active);
    }
}
