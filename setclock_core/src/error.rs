//! Error types for the setclock_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for setclock_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Workout plan is unusable (empty, zero sets, ...)
    #[error("Plan error: {0}")]
    Plan(String),

    /// Audio output could not be opened or driven
    #[error("Audio error: {0}")]
    Audio(String),

    /// Built without any audio backend
    #[error("built without the `audio` feature")]
    NoAudioBackend,

    /// Generic error
    #[error("{0}")]
    Other(String),
}
