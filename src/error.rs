//! Error types for Companion

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Companion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Companion
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio file passed on the command line does not exist
    #[error("audio file not found: {}", .0.display())]
    AudioNotFound(PathBuf),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Transcription succeeded but produced no text
    #[error("no transcript produced")]
    EmptyTranscript,

    /// Chat endpoint error
    #[error("chat error: {0}")]
    Chat(String),

    /// Chat stream finished without any reply text
    #[error("model returned an empty reply")]
    EmptyReply,

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Conversation history error
    #[error("history error: {0}")]
    History(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
