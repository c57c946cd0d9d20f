//! Locomotion configuration
//!
//! Settings are fixed once the component is built. They can be loaded from and
//! saved to RON or JSON files; every field has a default, so partial files are
//! accepted.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Complete locomotion configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Names of the sampled gamepad axes
    pub axes: AxisBindings,
    /// Per-action enable switches
    pub features: FeatureToggles,
    /// Degrees turned per rotate action
    pub rotation_step: f32,
    /// Metres moved per strafe action
    pub strafe_distance: f32,
    /// Input classification thresholds
    pub thresholds: Thresholds,
    /// Fade durations per action
    pub timings: FadeTimings,
    /// Eye-height probe used after a teleport
    pub ground_probe: GroundProbe,
    /// Teleport marker template
    pub marker: MarkerTemplate,
    /// How the headset reports height
    pub tracking_space: TrackingSpace,
    /// Whether input is classified from the first frame
    pub input_enabled: bool,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            axes: AxisBindings::default(),
            features: FeatureToggles::default(),
            rotation_step: 45.0,
            strafe_distance: 0.5,
            thresholds: Thresholds::default(),
            timings: FadeTimings::default(),
            ground_probe: GroundProbe::default(),
            marker: MarkerTemplate::default(),
            tracking_space: TrackingSpace::default(),
            input_enabled: true,
        }
    }
}

/// Axis names sampled each frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisBindings {
    /// Movement stick, horizontal
    pub movement_x: String,
    /// Movement stick, vertical
    pub movement_y: String,
    /// Rotation stick, horizontal
    pub rotation_x: String,
    /// Rotation stick, vertical
    pub rotation_y: String,
}

impl Default for AxisBindings {
    fn default() -> Self {
        Self {
            movement_x: String::from("left_stick_x"),
            movement_y: String::from("left_stick_y"),
            rotation_x: String::from("right_stick_x"),
            rotation_y: String::from("right_stick_y"),
        }
    }
}

/// Per-action enable switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureToggles {
    pub teleport: bool,
    pub strafe: bool,
    pub rotation: bool,
}

impl Default for FeatureToggles {
    fn default() -> Self {
        Self {
            teleport: true,
            strafe: true,
            rotation: true,
        }
    }
}

/// Stick and surface thresholds.
///
/// All comparisons are strict: a stick at exactly `activation` does not act,
/// and a surface whose normal has exactly `surface_alignment` with up is not a
/// valid teleport target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Primary-axis magnitude an action needs to exceed
    pub activation: f32,
    /// Orthogonal-axis magnitude an action must stay under
    pub orthogonal_limit: f32,
    /// Stick magnitude under which a teleport aim is released
    pub release: f32,
    /// Minimum `dot(normal, up)` of a valid teleport surface
    pub surface_alignment: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            activation: 0.8,
            orthogonal_limit: 0.3,
            release: 0.2,
            surface_alignment: 0.90,
        }
    }
}

/// Durations of one transition, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeTiming {
    pub fade_out: f32,
    pub fade_in: f32,
}

impl FadeTiming {
    #[must_use]
    pub const fn new(fade_out: f32, fade_in: f32) -> Self {
        Self { fade_out, fade_in }
    }
}

/// Fade durations per action
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeTimings {
    pub teleport: FadeTiming,
    pub rotation: FadeTiming,
    pub strafe: FadeTiming,
}

impl Default for FadeTimings {
    fn default() -> Self {
        Self {
            teleport: FadeTiming::new(0.25, 0.5),
            rotation: FadeTiming::new(0.25, 0.25),
            strafe: FadeTiming::new(0.25, 0.25),
        }
    }
}

/// Downward probe from the camera that measures eye height before a
/// stationary-space teleport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundProbe {
    /// Probe length in metres
    pub length: f32,
    /// Eye height used when the probe hits nothing
    pub fallback_height: f32,
}

impl Default for GroundProbe {
    fn default() -> Self {
        Self {
            length: 5.0,
            fallback_height: 2.6,
        }
    }
}

/// Template the teleport marker is spawned from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerTemplate {
    /// Uniform scale of the marker
    pub scale: f32,
    /// Length of one loop of the marker's pulse animation, in seconds
    pub animation_duration: f32,
}

impl Default for MarkerTemplate {
    fn default() -> Self {
        Self {
            scale: 1.0,
            animation_duration: 1.0,
        }
    }
}

/// How the headset reports the user's height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingSpace {
    /// Seated/standing origin at the head; eye height comes from the ground probe
    #[default]
    Stationary,
    /// Origin on the floor; eye height is the tracked head offset
    RoomScale,
}

impl LocomotionConfig {
    /// Parse a configuration from a RON string
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid RON for this structure
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|e| ConfigError::DeserializeError(e.to_string()))
    }

    /// Save the configuration to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::DeserializeError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        let unit = |v: f32| v.is_finite() && v > 0.0 && v <= 1.0;

        if !unit(t.activation) {
            return Err(ConfigError::Invalid(format!(
                "thresholds.activation must be in (0, 1], got {}",
                t.activation
            )));
        }
        if !unit(t.orthogonal_limit) {
            return Err(ConfigError::Invalid(format!(
                "thresholds.orthogonal_limit must be in (0, 1], got {}",
                t.orthogonal_limit
            )));
        }
        if !unit(t.release) || t.release >= t.activation {
            return Err(ConfigError::Invalid(format!(
                "thresholds.release must be in (0, activation), got {}",
                t.release
            )));
        }
        if !(-1.0..=1.0).contains(&t.surface_alignment) {
            return Err(ConfigError::Invalid(format!(
                "thresholds.surface_alignment must be in [-1, 1], got {}",
                t.surface_alignment
            )));
        }

        for (name, timing) in [
            ("teleport", self.timings.teleport),
            ("rotation", self.timings.rotation),
            ("strafe", self.timings.strafe),
        ] {
            if !(timing.fade_out >= 0.0 && timing.fade_in >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "timings.{name} durations must be non-negative"
                )));
            }
        }

        if !(self.ground_probe.length > 0.0) {
            return Err(ConfigError::Invalid(String::from(
                "ground_probe.length must be positive",
            )));
        }
        if !self.rotation_step.is_finite() || !self.strafe_distance.is_finite() {
            return Err(ConfigError::Invalid(String::from(
                "rotation_step and strafe_distance must be finite",
            )));
        }
        if !(self.marker.animation_duration >= 0.0) {
            return Err(ConfigError::Invalid(String::from(
                "marker.animation_duration must be non-negative",
            )));
        }

        Ok(())
    }
}

/// Errors that can occur while loading or saving configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// A value is out of range
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LocomotionConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.thresholds.activation, 0.8);
        assert_eq!(config.ground_probe.fallback_height, 2.6);
        assert_eq!(config.tracking_space, TrackingSpace::Stationary);
    }

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = LocomotionConfig::from_ron_str(
            "(rotation_step: 30.0, features: (strafe: false), tracking_space: RoomScale)",
        )
        .unwrap();

        assert_eq!(config.rotation_step, 30.0);
        assert!(!config.features.strafe);
        assert!(config.features.teleport);
        assert_eq!(config.tracking_space, TrackingSpace::RoomScale);
        assert_eq!(config.axes.movement_y, "left_stick_y");
    }

    #[test]
    fn test_config_serialization_ron() {
        let mut config = LocomotionConfig::default();
        config.axes.rotation_x = String::from("pad_right_x");

        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("pad_right_x"));

        let loaded = LocomotionConfig::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_file_json() {
        let path = std::env::temp_dir().join(format!(
            "locomotion-config-{}.json",
            std::process::id()
        ));
        let mut config = LocomotionConfig::default();
        config.strafe_distance = 0.75;

        config.save_json(&path).unwrap();
        let loaded = LocomotionConfig::load_json(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.strafe_distance, 0.75);
    }

    #[test]
    fn test_validate_rejects_release_above_activation() {
        let mut config = LocomotionConfig::default();
        config.thresholds.release = 0.9;

        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_negative_fade() {
        let mut config = LocomotionConfig::default();
        config.timings.strafe.fade_in = -0.1;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("strafe"));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = LocomotionConfig::load_ron("/nonexistent/locomotion.ron");
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
