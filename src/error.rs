// ============================================================================
// ERROR TYPES
// ============================================================================

use std::path::PathBuf;

/// Fatal precondition violations raised inside a controller callback.
///
/// None of these are retried: physics state is not idempotent across ticks,
/// so the host is expected to log the error and stop driving the entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    /// The controlled doodad has no rigid body to read or write velocity on.
    MissingRigidBody { doodad: String },
    /// A tick or frame callback arrived before `awaken`.
    NotAwake,
    /// Tick metadata was zero, negative or not finite.
    InvalidTickRate(f32),
}

impl std::fmt::Display for ControlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlError::MissingRigidBody { doodad } => {
                write!(f, "doodad '{doodad}' has no rigid body to drive")
            }
            ControlError::NotAwake => write!(f, "controller callback invoked before awaken"),
            ControlError::InvalidTickRate(v) => write!(f, "invalid tick rate: {v}"),
        }
    }
}

impl std::error::Error for ControlError {}

/// Errors that can occur while loading or validating a controller config.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The file is not valid TOML for `ControllerConfig`.
    Parse(toml::de::Error),
    /// The values parsed but break an invariant (e.g. a gear with zero acceleration).
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "read {}: {source}", path.display()),
            ConfigError::Parse(e) => write!(f, "TOML error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}
