//! Handler table
//!
//! One optional callback per envelope kind and per subscription type, plus
//! the raw-event escape hatch and the error handler. Setters consume and
//! return the table so it reads like a builder; a later registration for
//! the same kind replaces the earlier one. The table is moved into the
//! client before `run`, so it is read-only while the client runs.
//!
//! Typed event setters (`on_channel_follow`, `on_stream_online`, ...) are
//! generated next to the subscription catalogue in
//! [`crate::protocol::subscription`].

use crate::error::EventSubError;
use crate::protocol::{
    Event, KeepAliveMessage, MessageMetadata, NotificationMessage, PayloadContext,
    PayloadSubscription, ReconnectMessage, RevocationMessage, SubscriptionType, WelcomeMessage,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Receives every non-fatal error
pub type ErrorHandler = Arc<dyn Fn(EventSubError) + Send + Sync>;

/// Receives one decoded envelope of a given kind
pub type LifecycleHandler<M> = Arc<dyn Fn(M) + Send + Sync>;

/// Receives the undecoded event JSON with its routing metadata
pub type RawEventHandler = Arc<dyn Fn(String, MessageMetadata, PayloadSubscription) + Send + Sync>;

/// Type-erased typed event handler
pub(crate) type EventHandler = Arc<dyn Fn(Event, PayloadContext) + Send + Sync>;

/// Error handler installed by [`HandlerTable::new`]: logs and moves on
pub fn default_error_handler() -> ErrorHandler {
    Arc::new(|err: EventSubError| {
        error!(error = %err, "EventSub error");
    })
}

/// Registered callbacks, keyed by message or event kind
#[derive(Clone)]
pub struct HandlerTable {
    pub(crate) on_error: ErrorHandler,
    pub(crate) on_welcome: Option<LifecycleHandler<WelcomeMessage>>,
    pub(crate) on_keepalive: Option<LifecycleHandler<KeepAliveMessage>>,
    pub(crate) on_notification: Option<LifecycleHandler<NotificationMessage>>,
    pub(crate) on_reconnect: Option<LifecycleHandler<ReconnectMessage>>,
    pub(crate) on_revocation: Option<LifecycleHandler<RevocationMessage>>,
    pub(crate) on_raw_event: Option<RawEventHandler>,
    pub(crate) events: HashMap<SubscriptionType, EventHandler>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self {
            on_error: default_error_handler(),
            on_welcome: None,
            on_keepalive: None,
            on_notification: None,
            on_reconnect: None,
            on_revocation: None,
            on_raw_event: None,
            events: HashMap::new(),
        }
    }

    /// Replace the default error reporter
    pub fn on_error<F>(mut self, handler: F) -> Self
    where
        F: Fn(EventSubError) + Send + Sync + 'static,
    {
        self.on_error = Arc::new(handler);
        self
    }

    /// Handle `session_welcome`; required before the client can run
    pub fn on_welcome<F>(mut self, handler: F) -> Self
    where
        F: Fn(WelcomeMessage) + Send + Sync + 'static,
    {
        self.on_welcome = Some(Arc::new(handler));
        self
    }

    pub fn on_keepalive<F>(mut self, handler: F) -> Self
    where
        F: Fn(KeepAliveMessage) + Send + Sync + 'static,
    {
        self.on_keepalive = Some(Arc::new(handler));
        self
    }

    /// Handle every notification of a known subscription type, before typed decode
    pub fn on_notification<F>(mut self, handler: F) -> Self
    where
        F: Fn(NotificationMessage) + Send + Sync + 'static,
    {
        self.on_notification = Some(Arc::new(handler));
        self
    }

    /// Observe `session_reconnect`; the connection swap happens regardless
    pub fn on_reconnect<F>(mut self, handler: F) -> Self
    where
        F: Fn(ReconnectMessage) + Send + Sync + 'static,
    {
        self.on_reconnect = Some(Arc::new(handler));
        self
    }

    pub fn on_revocation<F>(mut self, handler: F) -> Self
    where
        F: Fn(RevocationMessage) + Send + Sync + 'static,
    {
        self.on_revocation = Some(Arc::new(handler));
        self
    }

    /// Escape hatch for subscription types the client does not model
    ///
    /// Fires for every notification, known or not.
    pub fn on_raw_event<F>(mut self, handler: F) -> Self
    where
        F: Fn(String, MessageMetadata, PayloadSubscription) + Send + Sync + 'static,
    {
        self.on_raw_event = Some(Arc::new(handler));
        self
    }

    pub(crate) fn with_event_handler<F>(mut self, subscription_type: SubscriptionType, handler: F) -> Self
    where
        F: Fn(Event, PayloadContext) + Send + Sync + 'static,
    {
        self.events.insert(subscription_type, Arc::new(handler));
        self
    }

    /// Whether the mandatory welcome handler is set
    pub fn has_welcome_handler(&self) -> bool {
        self.on_welcome.is_some()
    }

    pub fn has_event_handler(&self, subscription_type: SubscriptionType) -> bool {
        self.events.contains_key(&subscription_type)
    }

    /// Number of typed event handlers registered
    pub fn event_handler_count(&self) -> usize {
        self.events.len()
    }
}

impl Default for HandlerTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<&'static str> = self.events.keys().map(|t| t.tag()).collect();
        events.sort_unstable();

        f.debug_struct("HandlerTable")
            .field("on_welcome", &self.on_welcome.is_some())
            .field("on_keepalive", &self.on_keepalive.is_some())
            .field("on_notification", &self.on_notification.is_some())
            .field("on_reconnect", &self.on_reconnect.is_some())
            .field("on_revocation", &self.on_revocation.is_some())
            .field("on_raw_event", &self.on_raw_event.is_some())
            .field("events", &events)
            .finish()
    }
}
