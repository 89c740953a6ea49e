//! Envelope codec
//!
//! Every frame is `{"metadata": {...}, "payload": {...}}`. Decoding is done
//! in two passes: [`peek_metadata`] reads only the wrapper so the message
//! type can pick a destination shape, then the registry decodes the whole
//! frame into that shape.

use crate::error::{EventSubError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Metadata common to every envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub message_timestamp: Option<DateTime<Utc>>,
    /// Only present on notification and revocation envelopes
    #[serde(default)]
    pub subscription_type: Option<String>,
    #[serde(default)]
    pub subscription_version: Option<String>,
}

/// Outer wire message with a typed payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<P> {
    pub metadata: MessageMetadata,
    pub payload: P,
}

/// Session descriptor carried by welcome and reconnect envelopes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub keepalive_timeout_seconds: Option<u64>,
    #[serde(default)]
    pub reconnect_url: Option<String>,
    #[serde(default)]
    pub connected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recovery_url: Option<String>,
}

/// How a subscription delivers its events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionTransport {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub conduit_id: Option<String>,
    #[serde(default)]
    pub callback: Option<String>,
}

/// Subscription descriptor attached to notifications and revocations
///
/// Used purely as a routing key; the client never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadSubscription {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type")]
    pub subscription_type: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub condition: serde_json::Value,
    #[serde(default)]
    pub transport: SubscriptionTransport,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WelcomePayload {
    pub session: Session,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeepAlivePayload {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub subscription: PayloadSubscription,
    /// Event body, kept undecoded until the subscription type picks a shape
    pub event: Box<RawValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconnectPayload {
    pub session: Session,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevocationPayload {
    pub subscription: PayloadSubscription,
}

pub type WelcomeMessage = Envelope<WelcomePayload>;
pub type KeepAliveMessage = Envelope<KeepAlivePayload>;
pub type NotificationMessage = Envelope<NotificationPayload>;
pub type ReconnectMessage = Envelope<ReconnectPayload>;
pub type RevocationMessage = Envelope<RevocationPayload>;

impl NotificationMessage {
    /// Undecoded event JSON
    pub fn raw_event(&self) -> &str {
        self.payload.event.get()
    }

    /// Routing context handed to typed event handlers
    pub fn context(&self) -> PayloadContext {
        PayloadContext {
            metadata: self.metadata.clone(),
            subscription: self.payload.subscription.clone(),
        }
    }
}

impl ReconnectMessage {
    /// URL the replacement connection must be opened against
    pub fn reconnect_url(&self) -> Option<&str> {
        self.payload.session.reconnect_url.as_deref()
    }
}

/// Why the server revoked a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevocationReason {
    AuthorizationRevoked,
    UserRemoved,
    VersionRemoved,
    Other(String),
}

impl RevocationMessage {
    pub fn reason(&self) -> RevocationReason {
        match self.payload.subscription.status.as_str() {
            "authorization_revoked" => RevocationReason::AuthorizationRevoked,
            "user_removed" => RevocationReason::UserRemoved,
            "version_removed" => RevocationReason::VersionRemoved,
            other => RevocationReason::Other(other.to_string()),
        }
    }
}

/// Metadata and subscription of the notification an event arrived in
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadContext {
    pub metadata: MessageMetadata,
    pub subscription: PayloadSubscription,
}

#[derive(Deserialize)]
struct Wrapper {
    #[serde(default)]
    metadata: Option<MessageMetadata>,
}

/// First decode pass: recover the wrapper metadata without knowing the payload shape
///
/// Fails with [`EventSubError::Decode`] when the bytes are not a JSON object
/// and with [`EventSubError::MissingMessageType`] when the wrapper has no tag.
pub fn peek_metadata(data: &[u8]) -> Result<MessageMetadata> {
    let wrapper: Wrapper = serde_json::from_slice(data).map_err(|e| {
        EventSubError::Decode(format!("could not read envelope wrapper: {}", e))
    })?;

    match wrapper.metadata {
        Some(metadata) if !metadata.message_type.is_empty() => Ok(metadata),
        _ => Err(EventSubError::MissingMessageType),
    }
}

/// Second decode pass: the whole frame into a concrete envelope
pub(crate) fn decode_envelope<P>(tag: &str, shape: &'static str, data: &[u8]) -> Result<Envelope<P>>
where
    P: serde::de::DeserializeOwned,
{
    serde_json::from_slice(data).map_err(|e| EventSubError::PayloadMismatch {
        tag: tag.to_string(),
        shape,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_recovers_type_without_payload_shape() {
        let data = br#"{
            "metadata": {
                "message_id": "96a3f3b5-5dec-4eed-908e-e11ee657416c",
                "message_type": "session_welcome",
                "message_timestamp": "2023-07-19T14:56:51.634234626Z"
            },
            "payload": {"anything": [1, 2, 3]}
        }"#;

        let metadata = peek_metadata(data).unwrap();
        assert_eq!(metadata.message_type, "session_welcome");
        assert_eq!(metadata.message_id, "96a3f3b5-5dec-4eed-908e-e11ee657416c");
        assert!(metadata.message_timestamp.is_some());
        assert!(metadata.subscription_type.is_none());
    }

    #[test]
    fn test_peek_rejects_malformed_bytes() {
        let err = peek_metadata(b"not json at all").unwrap_err();
        assert!(matches!(err, EventSubError::Decode(_)));

        let err = peek_metadata(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, EventSubError::Decode(_)));
    }

    #[test]
    fn test_peek_requires_message_type() {
        let err = peek_metadata(br#"{"metadata": {"message_id": "1"}, "payload": {}}"#).unwrap_err();
        assert!(matches!(err, EventSubError::MissingMessageType));

        let err = peek_metadata(br#"{"payload": {}}"#).unwrap_err();
        assert!(matches!(err, EventSubError::MissingMessageType));

        let err = peek_metadata(br#"{"metadata": {"message_type": ""}}"#).unwrap_err();
        assert!(matches!(err, EventSubError::MissingMessageType));
    }

    #[test]
    fn test_notification_keeps_raw_event() {
        let data = br#"{
            "metadata": {"message_id": "1", "message_type": "notification"},
            "payload": {
                "subscription": {"id": "s1", "type": "channel.follow", "version": "2"},
                "event": {"user_id": "1234", "nested": {"a": 1}}
            }
        }"#;

        let message: NotificationMessage =
            decode_envelope("notification", "NotificationMessage", data).unwrap();
        assert_eq!(message.payload.subscription.subscription_type, "channel.follow");
        assert_eq!(message.payload.subscription.version, "2");

        let event: serde_json::Value = serde_json::from_str(message.raw_event()).unwrap();
        assert_eq!(event["user_id"], "1234");

        let context = message.context();
        assert_eq!(context.subscription.id, "s1");
        assert_eq!(context.metadata.message_type, "notification");
    }

    #[test]
    fn test_revocation_reason() {
        let mut message = RevocationMessage {
            metadata: MessageMetadata::default(),
            payload: RevocationPayload::default(),
        };

        message.payload.subscription.status = "authorization_revoked".into();
        assert_eq!(message.reason(), RevocationReason::AuthorizationRevoked);

        message.payload.subscription.status = "version_removed".into();
        assert_eq!(message.reason(), RevocationReason::VersionRemoved);

        message.payload.subscription.status = "something_new".into();
        assert_eq!(
            message.reason(),
            RevocationReason::Other("something_new".into())
        );
    }

    #[test]
    fn test_payload_mismatch_names_shape() {
        let data = br#"{"metadata": {"message_type": "session_welcome"}, "payload": {}}"#;
        let err = decode_envelope::<WelcomePayload>("session_welcome", "WelcomeMessage", data)
            .unwrap_err();

        match err {
            EventSubError::PayloadMismatch { tag, shape, .. } => {
                assert_eq!(tag, "session_welcome");
                assert_eq!(shape, "WelcomeMessage");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
