//! Teleport marker
//!
//! The marker is the visual proxy shown at the teleport target. It pulses
//! while the target is valid and freezes while it is not.

use crate::core::MarkerTemplate;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Animation is playing
    Playing,
    /// Animation is paused
    Paused,
    /// Animation has stopped
    #[default]
    Stopped,
}

/// Looping pulse animation of the marker
#[derive(Debug, Clone)]
pub struct MarkerAnimation {
    /// Loop length in seconds
    duration: f32,
    /// Current playback time in seconds
    current_time: f32,
    /// Playback speed multiplier
    speed: f32,
    /// Current playback state
    state: PlaybackState,
}

impl MarkerAnimation {
    /// Create a stopped animation with the given loop length
    #[must_use]
    pub fn new(duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            current_time: 0.0,
            speed: 1.0,
            state: PlaybackState::Stopped,
        }
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        self.state = PlaybackState::Playing;
    }

    /// Stop playback and reset to beginning
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.current_time = 0.0;
    }

    /// Hold on the first frame
    pub fn rewind_paused(&mut self) {
        self.current_time = 0.0;
        self.state = PlaybackState::Paused;
    }

    /// Update playback (call each frame)
    pub fn update(&mut self, delta_time: f32) {
        if self.state != PlaybackState::Playing {
            return;
        }

        if self.duration <= 0.0 {
            self.current_time = 0.0;
            return;
        }

        self.current_time = (self.current_time + delta_time * self.speed).rem_euclid(self.duration);
    }

    /// Get current playback time
    #[must_use]
    pub const fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Get playback state
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Playing at a non-zero speed
    #[must_use]
    pub fn is_advancing(&self) -> bool {
        self.state == PlaybackState::Playing && self.speed != 0.0
    }

    /// Get playback speed
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Set playback speed; 0.0 freezes the current frame
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Get the normalized playback time (0.0 to 1.0)
    #[must_use]
    pub fn normalized_time(&self) -> f32 {
        if self.duration > 0.0 {
            self.current_time / self.duration
        } else {
            0.0
        }
    }
}

/// Marker component attached to the marker entity
#[derive(Debug, Clone)]
pub struct TeleportMarker {
    enabled: bool,
    scale: f32,
    animation: MarkerAnimation,
}

impl TeleportMarker {
    /// Instantiate a hidden marker from its template
    #[must_use]
    pub fn from_template(template: &MarkerTemplate) -> Self {
        Self {
            enabled: false,
            scale: template.scale,
            animation: MarkerAnimation::new(template.animation_duration),
        }
    }

    /// Show the marker, holding its animation on the first frame
    pub fn enable(&mut self) {
        self.enabled = true;
        self.animation.rewind_paused();
    }

    /// Hide the marker
    pub fn disable(&mut self) {
        self.enabled = false;
        self.animation.stop();
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    #[must_use]
    pub const fn animation(&self) -> &MarkerAnimation {
        &self.animation
    }

    pub fn animation_mut(&mut self) -> &mut MarkerAnimation {
        &mut self.animation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_holds_first_frame() {
        let mut marker = TeleportMarker::from_template(&MarkerTemplate::default());
        assert!(!marker.is_enabled());

        marker.animation_mut().play();
        marker.animation_mut().update(0.4);
        marker.enable();

        assert!(marker.is_enabled());
        assert_eq!(marker.animation().state(), PlaybackState::Paused);
        assert_eq!(marker.animation().current_time(), 0.0);

        marker.animation_mut().update(0.5);
        assert_eq!(marker.animation().current_time(), 0.0);
    }

    #[test]
    fn test_zero_speed_freezes_frame() {
        let mut animation = MarkerAnimation::new(1.0);
        animation.play();
        animation.update(0.25);

        animation.set_speed(0.0);
        animation.update(0.5);

        assert!(!animation.is_advancing());
        assert!((animation.current_time() - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_animation_loops() {
        let mut animation = MarkerAnimation::new(1.0);
        animation.play();

        animation.update(0.5);
        assert!((animation.normalized_time() - 0.5).abs() < 0.01);

        animation.update(0.8);
        assert!(animation.current_time() < 0.5);
    }
}
