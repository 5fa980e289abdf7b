//! Error types for the tickstore client
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using TickError
pub type Result<T> = std::result::Result<T, TickError>;

/// Unified error type for tickstore client operations
#[derive(Debug, Error)]
pub enum TickError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Framing Errors (fatal to the connection, never retried here)
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed by peer mid-read")]
    ConnectionClosed,

    // -------------------------------------------------------------------------
    // Application Errors
    // -------------------------------------------------------------------------
    /// The server answered with `success = false`. The payload is the
    /// diagnostic message from the response body, never parsed as JSON.
    #[error("Server error: {0}")]
    Server(String),

    /// The server answered with `success = true` but the body failed to
    /// parse as JSON. Kept distinct from `Server` so callers can tell
    /// "request rejected" apart from "accepted but malformed data".
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Subscription State Errors
    // -------------------------------------------------------------------------
    #[error("Not subscribed: poll requires a prior SUBSCRIBE")]
    NotSubscribed,

    #[error("Already subscribed to {0}")]
    AlreadySubscribed(String),
}

impl TickError {
    /// True when the connection must be discarded and re-established
    /// before issuing further commands.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TickError::Io(_) | TickError::Protocol(_) | TickError::ConnectionClosed
        )
    }
}
