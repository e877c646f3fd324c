//! Error types for pipekv
//!
//! Every `EndpointError` is fatal to the connection it came from. Error
//! replies for pipelined commands are not errors: the reply decoder hands
//! them back as `Ok(Some(message))`.

use thiserror::Error;

/// Result type alias using EndpointError
pub type Result<T> = std::result::Result<T, EndpointError>;

/// Unified error type for endpoint operations
#[derive(Debug, Error)]
pub enum EndpointError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    /// The byte stream framing can no longer be trusted
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    /// The server answered a handshake command with an error reply
    #[error("Handshake failed: {command} replied {reason}")]
    Handshake { command: String, reason: String },

    #[error("Endpoint is closed")]
    Closed,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EndpointError {
    /// True when the error came from the transport reaching end of stream
    pub fn is_eof(&self) -> bool {
        matches!(self, EndpointError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}
