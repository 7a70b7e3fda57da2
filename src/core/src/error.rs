use thiserror::Error;

/// Docker fixture error types
#[derive(Error, Debug)]
pub enum FixtureError {
    /// A step of the archive build sequence failed
    #[error("Docker archive error: {0}")]
    ArchiveError(String),

    /// Rootfs population failed
    #[error("Rootfs error: {0}")]
    RootfsError(String),

    /// Tar packing failed
    #[error("Pack error: {0}")]
    PackError(String),

    /// A packing task was cancelled before it produced a result
    #[error("discarded")]
    Discarded,

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for FixtureError {
    fn from(err: serde_json::Error) -> Self {
        FixtureError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for FixtureError {
    fn from(err: serde_yaml::Error) -> Self {
        FixtureError::SerializationError(err.to_string())
    }
}

/// Result type alias for docker fixture operations
pub type Result<T> = std::result::Result<T, FixtureError>;
