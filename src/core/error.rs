//! Startup errors

use super::config::ConfigError;

/// Why a locomotion component could not be built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocomotionError {
    /// A required host collaborator was not supplied
    MissingCollaborator(&'static str),
    /// No immersive display is connected
    DisplayUnavailable,
    /// The configuration failed validation
    Config(ConfigError),
}

impl std::fmt::Display for LocomotionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCollaborator(name) => write!(f, "missing collaborator: {name}"),
            Self::DisplayUnavailable => write!(f, "no immersive display present"),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LocomotionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for LocomotionError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}
