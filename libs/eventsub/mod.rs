//! # EventSub
//!
//! A persistent streaming client for Twitch EventSub over WebSocket.
//!
//! ## Features
//!
//! - **Two-level dispatch**: envelope kind first, then subscription type for notifications
//! - **Closed sum types**: every known envelope and event kind is a variant, unknown tags are errors
//! - **Seamless reconnect**: the candidate connection is welcomed before the swap commits
//! - **Non-blocking handlers**: callbacks run on the blocking pool, panics are contained
//! - **Raw passthrough**: every notification can also be observed as undecoded JSON

pub mod core;
pub mod protocol;
pub mod traits;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use self::core::{
    client, config, connection_state, dispatcher, handlers,
    client::EventSubClient,
    config::ClientConfig,
    connection_state::{AtomicConnectionState, ConnectionState},
    handlers::HandlerTable,
};

// Re-export protocol types
pub use protocol::{
    events, Event, EventShape, Message, MessageMetadata, PayloadContext, PayloadSubscription,
    Session, SubscriptionType,
};
