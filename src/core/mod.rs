//! Core module
//!
//! Configuration, errors and the event queue shared by the locomotion
//! component and its host.

mod config;
mod error;
mod events;

pub use config::{
    AxisBindings, ConfigError, FadeTiming, FadeTimings, FeatureToggles, GroundProbe,
    LocomotionConfig, MarkerTemplate, Thresholds, TrackingSpace,
};
pub use error::LocomotionError;
pub use events::{EventQueue, LocomotionEvent};
