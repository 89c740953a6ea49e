use thiserror::Error;

/// Main error type for the EventSub client
///
/// Variants fall into two groups. Fatal errors end a run and are returned
/// from [`crate::EventSubClient::run`]. Everything else is reported to the
/// error handler while the read loop keeps going.
#[derive(Error, Debug)]
pub enum EventSubError {
    /// Frame bytes are not well-formed JSON or do not fit the envelope wrapper
    #[error("Decode error: {0}")]
    Decode(String),

    /// Envelope wrapper has no `metadata.message_type`
    #[error("Decode error: envelope has no message_type")]
    MissingMessageType,

    /// Envelope tag is not one of the known message types
    #[error("Unknown message type: {0}")]
    UnknownEnvelopeType(String),

    /// Notification carries a subscription type the client does not know
    #[error("Unknown subscription type: {0}")]
    UnknownSubscriptionType(String),

    /// Bytes do not fit the shape selected by a registry
    #[error("Could not decode {tag} into {shape}: {reason}")]
    PayloadMismatch {
        tag: String,
        shape: &'static str,
        reason: String,
    },

    /// Reconnect handshake did not complete, the old transport stays current
    #[error("Reconnect failed: {0}")]
    ReconnectFailed(String),

    /// `run` was called without a welcome handler
    #[error("on_welcome handler was not set")]
    MissingWelcomeHandler,

    /// Opening a transport failed
    #[error("Could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    /// Transport-level read or write failure
    #[error("WebSocket error: {0}")]
    Transport(String),

    /// Peer closed the connection abnormally
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid state transition
    #[error("Invalid state transition: {0}")]
    InvalidState(String),
}

impl EventSubError {
    /// Whether this error ends a run instead of being reported and skipped
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EventSubError::MissingWelcomeHandler
                | EventSubError::Connect { .. }
                | EventSubError::Transport(_)
                | EventSubError::ConnectionClosed(_)
                | EventSubError::Configuration(_)
                | EventSubError::InvalidState(_)
        )
    }
}

/// Result type for EventSub operations
pub type Result<T> = std::result::Result<T, EventSubError>;
