use thiserror::Error;

/// Top-level error type for the Bellhop system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for BellhopError` so that the `?` operator works
/// seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BellhopError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for BellhopError {
    fn from(err: toml::de::Error) -> Self {
        BellhopError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for BellhopError {
    fn from(err: toml::ser::Error) -> Self {
        BellhopError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for BellhopError {
    fn from(err: serde_json::Error) -> Self {
        BellhopError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Bellhop operations.
pub type Result<T> = std::result::Result<T, BellhopError>;
