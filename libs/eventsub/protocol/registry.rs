//! Envelope type registry
//!
//! Maps the `metadata.message_type` tag to the envelope shape the frame is
//! decoded into. The set of shapes is closed: anything else is
//! [`EventSubError::UnknownEnvelopeType`].

use super::envelope::{
    decode_envelope, peek_metadata, KeepAliveMessage, MessageMetadata, NotificationMessage,
    ReconnectMessage, RevocationMessage, WelcomeMessage,
};
use crate::error::{EventSubError, Result};

/// Envelope kinds known to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    Welcome,
    KeepAlive,
    Notification,
    Reconnect,
    Revocation,
}

impl EnvelopeKind {
    pub const ALL: [EnvelopeKind; 5] = [
        EnvelopeKind::Welcome,
        EnvelopeKind::KeepAlive,
        EnvelopeKind::Notification,
        EnvelopeKind::Reconnect,
        EnvelopeKind::Revocation,
    ];

    /// Look up a wire tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "session_welcome" => Some(EnvelopeKind::Welcome),
            "session_keepalive" => Some(EnvelopeKind::KeepAlive),
            "notification" => Some(EnvelopeKind::Notification),
            "session_reconnect" => Some(EnvelopeKind::Reconnect),
            "revocation" => Some(EnvelopeKind::Revocation),
            _ => None,
        }
    }

    /// Wire tag for this kind
    pub fn tag(&self) -> &'static str {
        match self {
            EnvelopeKind::Welcome => "session_welcome",
            EnvelopeKind::KeepAlive => "session_keepalive",
            EnvelopeKind::Notification => "notification",
            EnvelopeKind::Reconnect => "session_reconnect",
            EnvelopeKind::Revocation => "revocation",
        }
    }

    /// Name of the shape frames of this kind decode into
    pub fn shape(&self) -> &'static str {
        match self {
            EnvelopeKind::Welcome => "WelcomeMessage",
            EnvelopeKind::KeepAlive => "KeepAliveMessage",
            EnvelopeKind::Notification => "NotificationMessage",
            EnvelopeKind::Reconnect => "ReconnectMessage",
            EnvelopeKind::Revocation => "RevocationMessage",
        }
    }

    /// Decode a whole frame into this kind's shape
    pub fn decode(self, data: &[u8]) -> Result<Message> {
        let tag = self.tag();
        let shape = self.shape();
        Ok(match self {
            EnvelopeKind::Welcome => Message::Welcome(decode_envelope(tag, shape, data)?),
            EnvelopeKind::KeepAlive => Message::KeepAlive(decode_envelope(tag, shape, data)?),
            EnvelopeKind::Notification => {
                Message::Notification(decode_envelope(tag, shape, data)?)
            }
            EnvelopeKind::Reconnect => Message::Reconnect(decode_envelope(tag, shape, data)?),
            EnvelopeKind::Revocation => Message::Revocation(decode_envelope(tag, shape, data)?),
        })
    }
}

/// A decoded envelope
#[derive(Debug, Clone)]
pub enum Message {
    Welcome(WelcomeMessage),
    KeepAlive(KeepAliveMessage),
    Notification(NotificationMessage),
    Reconnect(ReconnectMessage),
    Revocation(RevocationMessage),
}

impl Message {
    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Message::Welcome(_) => EnvelopeKind::Welcome,
            Message::KeepAlive(_) => EnvelopeKind::KeepAlive,
            Message::Notification(_) => EnvelopeKind::Notification,
            Message::Reconnect(_) => EnvelopeKind::Reconnect,
            Message::Revocation(_) => EnvelopeKind::Revocation,
        }
    }

    pub fn metadata(&self) -> &MessageMetadata {
        match self {
            Message::Welcome(m) => &m.metadata,
            Message::KeepAlive(m) => &m.metadata,
            Message::Notification(m) => &m.metadata,
            Message::Reconnect(m) => &m.metadata,
            Message::Revocation(m) => &m.metadata,
        }
    }
}

/// Resolve a tag, failing with [`EventSubError::UnknownEnvelopeType`]
pub fn lookup(tag: &str) -> Result<EnvelopeKind> {
    EnvelopeKind::from_tag(tag).ok_or_else(|| EventSubError::UnknownEnvelopeType(tag.to_string()))
}

/// Peek the wrapper, resolve its tag and decode the frame
pub fn decode_message(data: &[u8]) -> Result<Message> {
    let metadata = peek_metadata(data)?;
    lookup(&metadata.message_type)?.decode(data)
}
