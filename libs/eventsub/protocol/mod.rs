//! # EventSub wire protocol
//!
//! Envelope codec plus the two registries that turn string tags into typed
//! shapes:
//!
//! ```text
//! frame ─► peek_metadata ─► registry::lookup(message_type) ─► Message
//!                                                  │
//!                          Notification ◄──────────┘
//!                               │
//!                subscription::lookup(subscription.type) ─► Event | raw-only
//! ```

pub mod envelope;
pub mod events;
pub mod registry;
pub mod subscription;

pub use envelope::{
    peek_metadata, Envelope, KeepAliveMessage, KeepAlivePayload, MessageMetadata,
    NotificationMessage, NotificationPayload, PayloadContext, PayloadSubscription,
    ReconnectMessage, ReconnectPayload, RevocationMessage, RevocationPayload, RevocationReason,
    Session, SubscriptionTransport, WelcomeMessage, WelcomePayload,
};
pub use registry::{decode_message, EnvelopeKind, Message};
pub use subscription::{Event, EventShape, SubscriptionType};
