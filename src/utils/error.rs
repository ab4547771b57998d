//! Error types and handling
//!
//! Common error types used across the recorder.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Persist error: {0}")]
    Persist(String),

    #[error("Encode error: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Result type alias using RecorderError
pub type RecorderResult<T> = Result<T, RecorderError>;
