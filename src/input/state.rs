//! Input handling

use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::host::AxisSampler;

use super::event::{InputEvent, PressKind, SourceId};

/// Input state manager
///
/// Holds the latest value of every named analog axis and buffers positional
/// events from motion controllers until the frame drains them.
#[derive(Debug, Default)]
pub struct Input {
    /// Latest axis values by name
    axes: FxHashMap<String, f32>,
    /// Positional events received since the last drain
    pending: Vec<InputEvent>,
}

impl Input {
    /// Create a new input manager
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an axis value, clamped to [-1, 1]
    pub fn set_axis(&mut self, name: impl Into<String>, value: f32) {
        let value = if value.is_finite() {
            value.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.axes.insert(name.into(), value);
    }

    /// Record both components of a stick
    pub fn set_stick(&mut self, x_axis: &str, y_axis: &str, value: Vec2) {
        self.set_axis(x_axis, value.x);
        self.set_axis(y_axis, value.y);
    }

    /// Get the current value of an axis (0.0 when never set)
    #[must_use]
    pub fn axis(&self, name: &str) -> f32 {
        self.axes.get(name).copied().unwrap_or(0.0)
    }

    /// Return every axis to rest
    pub fn release_all(&mut self) {
        for value in self.axes.values_mut() {
            *value = 0.0;
        }
    }

    /// Process a motion controller position change
    pub fn process_position(&mut self, press: PressKind, position: Vec2, source: SourceId) {
        self.pending.push(InputEvent::PositionChanged {
            press,
            position,
            source,
        });
    }

    /// Number of positional events waiting to be dispatched
    #[must_use]
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Take the buffered positional events in arrival order
    pub fn drain_events(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.pending.drain(..)
    }
}

impl AxisSampler for Input {
    fn axis_value(&self, name: &str) -> f32 {
        self.axis(name)
    }
}
