//! Core error types for the Flowchat engine

use thiserror::Error;

/// Result type alias for Flowchat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Main error type for the Flowchat engine.
///
/// Transport-level failures are classified into one of these variants at the
/// boundary; raw `reqwest` errors never leak past the transport client. Each
/// variant maps onto exactly one [`ErrorKind`](super::ErrorKind).
#[derive(Error, Debug, Clone)]
pub enum ChatError {
    /// Connection could not be established or was interrupted
    #[error("Network error: {message}")]
    Network { message: String },

    /// The bounded wait elapsed before headers arrived
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// The server returned a non-success status
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// The streamed body failed mid-flight
    #[error("Stream error: {message}")]
    Stream { message: String },

    /// The stream ended without ever producing a start event
    #[error("Stream ended before it started")]
    StreamStartFailed,

    /// The server no longer recognizes the client's session id
    #[error("Session is no longer valid: {message}")]
    SessionInvalid { message: String },

    /// The operation was cancelled by the caller
    #[error("Operation was cancelled")]
    Cancelled,

    /// Durable session slot could not be read or written
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Anything that escaped the closed taxonomy
    #[error("Error: {message}")]
    Other { message: String },
}

impl ChatError {
    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a stream error
    pub fn stream(message: impl Into<String>) -> Self {
        Self::Stream {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Whether this error represents an intentional cancellation.
    ///
    /// Cancellation is not routed through the user-facing error path.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
