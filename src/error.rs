//! Error types for voxchat
//!
//! Uses thiserror for ergonomic error definitions with clear messages
//! that the presentation layer can surface to the user as-is.
//!
//! Errors derive `Clone`/`PartialEq`/`Eq` because session snapshots carry
//! the last error through a watch channel.

use thiserror::Error;

/// Top-level error type for the chat session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
}

/// Errors from the speech-to-text capability
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionError {
    #[error("Microphone or speech recognition access was denied. Enable it in system privacy settings.")]
    PermissionDenied,

    #[error("Speech recognition is restricted on this device.")]
    Restricted,

    #[error("Speech recognition permission has not been granted yet.")]
    NotDetermined,

    #[error("Speech recognition failed: {0}")]
    Recognition(String),
}

/// Errors from the question-answering endpoint
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Could not reach the answer service: {0}")]
    Transport(String),

    #[error("Answer service returned status {0}")]
    Status(u16),

    #[error("Could not parse the answer service response: {0}")]
    Decode(String),

    #[error("Answer service response is missing the 'answer' field")]
    MissingAnswer,
}

/// Result type alias using ChatError
pub type Result<T> = std::result::Result<T, ChatError>;
