//! Two-level message dispatch
//!
//! Level one resolves the envelope kind and fires the lifecycle handler.
//! Level two, for notifications only, resolves the subscription type and
//! fires the typed event handler.
//!
//! Handlers never run on the read loop. Each invocation is handed to the
//! blocking pool and `dispatch` returns as soon as it is scheduled, so a
//! slow callback cannot stall ingestion. A panic inside a callback is
//! caught at the invocation boundary and logged; it never reaches the loop.

use super::handlers::{HandlerTable, LifecycleHandler};
use crate::error::{EventSubError, Result};
use crate::protocol::subscription;
use crate::protocol::{decode_message, Event, Message, NotificationMessage, ReconnectMessage, Session};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// What the read loop has to act on after a frame was dispatched
#[derive(Debug, Clone)]
pub enum Routed {
    /// Nothing for the coordinator to do
    Continue,
    /// A welcome arrived on the transport of record
    Welcome(Session),
    /// The server asked the client to move to a new connection
    Reconnect(ReconnectMessage),
}

/// Routes decoded frames to the handler table
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Arc<HandlerTable>,
}

impl Dispatcher {
    pub fn new(handlers: Arc<HandlerTable>) -> Self {
        Self { handlers }
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    /// Decode one frame and schedule its handlers
    ///
    /// Decode and routing errors are handed to the error handler; they are
    /// never returned.
    pub fn dispatch(&self, data: &[u8]) -> Routed {
        match self.route(data) {
            Ok(routed) => routed,
            Err(e) => {
                self.report(e);
                Routed::Continue
            }
        }
    }

    /// Hand a non-fatal error to the error handler
    pub fn report(&self, err: EventSubError) {
        debug!(error = %err, "Reporting EventSub error");
        let handler = Arc::clone(&self.handlers.on_error);
        spawn_handler("error", move || handler(err));
    }

    fn route(&self, data: &[u8]) -> Result<Routed> {
        let message = decode_message(data)?;
        debug!(
            message_type = message.kind().tag(),
            message_id = %message.metadata().message_id,
            "Dispatching message"
        );

        match message {
            Message::Welcome(welcome) => {
                let session = welcome.payload.session.clone();
                invoke_lifecycle("session_welcome", &self.handlers.on_welcome, welcome);
                Ok(Routed::Welcome(session))
            }
            Message::KeepAlive(keepalive) => {
                invoke_lifecycle("session_keepalive", &self.handlers.on_keepalive, keepalive);
                Ok(Routed::Continue)
            }
            Message::Notification(notification) => {
                self.route_notification(notification)?;
                Ok(Routed::Continue)
            }
            Message::Reconnect(reconnect) => {
                if self.handlers.on_reconnect.is_some() {
                    invoke_lifecycle(
                        "session_reconnect",
                        &self.handlers.on_reconnect,
                        reconnect.clone(),
                    );
                }
                Ok(Routed::Reconnect(reconnect))
            }
            Message::Revocation(revocation) => {
                warn!(
                    subscription_type = %revocation.payload.subscription.subscription_type,
                    status = %revocation.payload.subscription.status,
                    "Subscription revoked"
                );
                invoke_lifecycle("revocation", &self.handlers.on_revocation, revocation);
                Ok(Routed::Continue)
            }
        }
    }

    fn route_notification(&self, message: NotificationMessage) -> Result<()> {
        if let Some(raw) = &self.handlers.on_raw_event {
            let raw = Arc::clone(raw);
            let event = message.raw_event().to_string();
            let metadata = message.metadata.clone();
            let descriptor = message.payload.subscription.clone();
            spawn_handler("raw_event", move || raw(event, metadata, descriptor));
        }

        let subscription_type = subscription::lookup(&message.payload.subscription.subscription_type)?;
        let event = Event::decode(subscription_type, message.raw_event());
        let context = message.context();

        if self.handlers.on_notification.is_some() {
            invoke_lifecycle("notification", &self.handlers.on_notification, message);
        }

        let Some(event) = event? else {
            debug!(subscription_type = subscription_type.tag(), "Raw-only event, no typed decode");
            return Ok(());
        };

        // Unhandled event kinds are expected as the protocol grows
        if let Some(handler) = self.handlers.events.get(&subscription_type) {
            let handler = Arc::clone(handler);
            spawn_handler(subscription_type.tag(), move || handler(event, context));
        }

        Ok(())
    }
}

fn invoke_lifecycle<M>(kind: &'static str, handler: &Option<LifecycleHandler<M>>, message: M)
where
    M: Send + 'static,
{
    if let Some(handler) = handler {
        let handler = Arc::clone(handler);
        spawn_handler(kind, move || handler(message));
    }
}

/// Run a callback on the blocking pool, containing any panic
pub(crate) fn spawn_handler<F>(kind: &'static str, f: F)
where
    F: FnOnce() + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        if let Err(panic) = catch_unwind(AssertUnwindSafe(f)) {
            error!(handler = kind, panic = panic_message(&panic), "Handler panicked");
        }
    });
}

fn panic_message(panic: &Box<dyn Any + Send>) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
