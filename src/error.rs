//! Error types for the TalkFlow client.

/// Top-level error type for the conversation client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request/connectivity error (health probe, stream connect).
    #[error("http error: {0}")]
    Http(String),

    /// Assistant stream transport error.
    #[error("stream error: {0}")]
    Stream(String),

    /// Document upload error. Carries the backend `detail` message when the
    /// response body provides one.
    #[error("upload error: {0}")]
    Upload(String),

    /// Speech synthesis/recognition error, including capability absence.
    #[error("speech error: {0}")]
    Speech(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Channel send/receive error.
    #[error("channel error: {0}")]
    Channel(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ClientError>;
