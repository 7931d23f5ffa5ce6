//! Error types for fedcodec.

use thiserror::Error;

/// Result type alias for fedcodec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fedcodec operations.
#[derive(Error, Debug)]
pub enum Error {
    // Gradient errors
    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    // Codec errors
    #[error("Unsupported compression method: {0}")]
    UnsupportedMethod(String),

    #[error("Decompression failed: {0}")]
    DecompressionFailed(String),

    // Persistence errors
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Integrity check failed: expected digest {expected}, got {actual}")]
    IntegrityCheckFailed { expected: String, actual: String },

    // Training boundary errors
    #[error("Training step failed: {0}")]
    Training(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}
